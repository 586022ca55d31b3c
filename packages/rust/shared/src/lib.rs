//! Shared types, error model, and configuration for AnswerScout.
//!
//! This crate is the foundation depended on by all other AnswerScout crates.
//! It provides:
//! - [`ScoutError`] — the unified error type
//! - Domain types ([`UrlNode`], [`ContentChunk`], [`Answer`], [`QuestionSet`])
//! - Configuration ([`AppConfig`], [`ExploreConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ExploreConfig, OpenAiConfig, ReportConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{Result, ScoutError};
pub use types::{Answer, ContentChunk, LinkScore, QuestionSet, UrlMetadata, UrlNode};
