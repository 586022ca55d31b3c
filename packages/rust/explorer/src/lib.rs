//! Question-guided web exploration engine.
//!
//! Given a set of natural-language questions and a seed site, the engine
//! crawls pages one at a time, scores discovered links for relevance to the
//! open question, extracts candidate answers from page content, and stops
//! per question once a confident answer is found or the page budget runs out.
//!
//! This crate provides:
//! - [`segment`] — markup → bounded-length text chunks
//! - [`links`] — anchor extraction and oracle relevance scoring
//! - [`frontier`] — the prioritized queue of not-yet-visited links
//! - [`cache`] — chunk storage with cosine-similarity retrieval
//! - [`extract`] — confidence-gated answer extraction
//! - [`engine`] — the per-question exploration orchestrator

pub mod cache;
pub mod engine;
pub mod events;
pub mod extract;
pub mod frontier;
pub mod links;
mod proto;
pub mod segment;

pub use cache::{ChunkCache, cosine_similarity};
pub use engine::{ExplorationState, Explorer, Phase, QuestionOutcome};
pub use events::ExploreEvent;
pub use extract::Validation;
pub use frontier::Frontier;
pub use segment::segment_page;
