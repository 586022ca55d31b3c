//! Chunk cache and similarity index for one question's exploration.
//!
//! Stores every processed chunk keyed by identifier and answers
//! nearest-neighbor queries with a linear cosine-similarity scan. The
//! per-question working set stays small (a handful of pages, tens of
//! chunks), so no vector index structure is warranted.

use std::collections::HashMap;

use answerscout_shared::{ContentChunk, Result, UrlNode};
use answerscout_oracle::EmbeddingOracle;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ,
/// so degenerate embeddings never poison a retrieval with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a.sqrt() * mag_b.sqrt())
}

/// In-memory store of processed chunks for the current question.
#[derive(Debug, Default)]
pub struct ChunkCache {
    chunks: HashMap<String, ContentChunk>,
}

impl ChunkCache {
    /// Construct an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a chunk, replacing any previous entry with the same id.
    pub fn insert(&mut self, chunk: ContentChunk) {
        self.chunks.insert(chunk.id.clone(), chunk);
    }

    /// Look up a chunk by identifier.
    pub fn get(&self, id: &str) -> Option<&ContentChunk> {
        self.chunks.get(id)
    }

    /// Number of cached chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Attach discovered links to every cached chunk of a page.
    pub fn attach_links(&mut self, page_id: &str, links: &[UrlNode]) {
        for chunk in self.chunks.values_mut() {
            if chunk.parent_page_id == page_id {
                chunk.urls = links.to_vec();
            }
        }
    }

    /// Find cached chunks whose embeddings are strictly more similar to
    /// `text` than `threshold`.
    ///
    /// The query text is embedded via the oracle; chunks without an
    /// embedding are skipped.
    pub async fn find_similar(
        &self,
        embedder: &dyn EmbeddingOracle,
        text: &str,
        threshold: f32,
    ) -> Result<Vec<ContentChunk>> {
        let query = embedder.embed(text).await?;
        Ok(self.find_similar_to(&query, threshold))
    }

    /// Similarity scan against an already-computed query embedding.
    pub fn find_similar_to(&self, query: &[f32], threshold: f32) -> Vec<ContentChunk> {
        let mut similar = Vec::new();
        for chunk in self.chunks.values() {
            if let Some(embedding) = &chunk.embedding {
                if cosine_similarity(query, embedding) > threshold {
                    similar.push(chunk.clone());
                }
            }
        }
        similar
    }
}
