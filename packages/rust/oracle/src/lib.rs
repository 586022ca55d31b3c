//! External collaborators consumed by the exploration engine.
//!
//! This crate defines the three seams the engine talks through:
//! - [`AnsweringOracle`] — turns a prompt into free text
//! - [`EmbeddingOracle`] — turns text into a fixed-size vector
//! - [`PageFetcher`] — turns a URL into raw markup
//!
//! Production implementations live in [`openai`] (OpenAI-compatible chat and
//! embedding endpoints) and [`fetcher`] (plain HTTP). Tests substitute
//! scripted doubles behind the same traits.

pub mod fetcher;
pub mod openai;

use answerscout_shared::Result;
use async_trait::async_trait;
use url::Url;

pub use fetcher::HttpFetcher;
pub use openai::OpenAiClient;

/// A language-generation service invoked as a black-box function.
///
/// Implementations must tolerate being asked to return strict JSON; callers
/// treat any non-conforming response as a soft failure.
#[async_trait]
pub trait AnsweringOracle: Send + Sync {
    /// Answer a prompt, optionally steered by a system instruction.
    async fn answer(&self, prompt: &str, system: Option<&str>) -> Result<String>;
}

/// An embedding service producing fixed-length float vectors.
///
/// Vector dimensionality must be consistent for a run; the engine uses the
/// vectors directly in cosine similarity without re-normalization.
#[async_trait]
pub trait EmbeddingOracle: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Fetches raw page markup. Follows redirects but does not execute scripts.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the document at `url` as text.
    async fn fetch(&self, url: &Url) -> Result<String>;
}
