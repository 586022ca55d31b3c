//! Error types for AnswerScout.
//!
//! Library crates use [`ScoutError`] via `thiserror`.
//! App crates wrap this with `color-eyre` for rich diagnostics.
//!
//! Most failures in the exploration engine are recovered locally (a page or
//! oracle call is abandoned, the loop continues); these variants exist so the
//! recovery sites can log a typed cause instead of a stringly one.

use std::path::PathBuf;

/// Top-level error type for all AnswerScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during page fetch or oracle call.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// An oracle response failed to match the expected JSON shape.
    #[error("oracle format error: {message}")]
    OracleFormat { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an oracle format error from any displayable message.
    pub fn oracle_format(msg: impl Into<String>) -> Self {
        Self::OracleFormat {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
