//! Core domain types for question-guided site exploration.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use url::Url;

/// The fixed question mapping for a run: identifier → natural-language text.
///
/// Keys must be unique (the map guarantees it); iteration order is the sorted
/// key order, which also fixes the order questions are explored in.
pub type QuestionSet = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// UrlNode
// ---------------------------------------------------------------------------

/// A discovered link, scored for relevance to one or more questions.
///
/// Owned by the frontier until dequeued; afterwards owned by the orchestrator
/// for the duration of exploring it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlNode {
    /// Stable identifier (`url_<page>_<seq>`).
    pub id: String,
    /// Absolute URL of the link target.
    pub url: Url,
    /// Oracle-estimated relevance in [0, 1].
    pub relevance_score: f64,
    /// Short oracle justification for the score.
    pub reasoning: String,
    /// Question identifiers this link was scored for.
    pub question_ids: Vec<String>,
    /// Identifier of the chunk/page the link was discovered in.
    pub parent_chunk_id: String,
    /// Whether the orchestrator has visited this URL.
    pub visited: bool,
    /// Confidence value; 0 at discovery, refined if reused as an answer source.
    pub confidence: f64,
}

impl UrlNode {
    /// Frontier ordering key: `relevance_score * (1 + confidence)`.
    pub fn priority(&self) -> f64 {
        self.relevance_score * (1.0 + self.confidence)
    }

    /// Whether this node was scored for the given question.
    pub fn scored_for(&self, question_id: &str) -> bool {
        self.question_ids.iter().any(|q| q == question_id)
    }
}

// ---------------------------------------------------------------------------
// ContentChunk
// ---------------------------------------------------------------------------

/// A bounded-length segment of a page's extracted text — the unit of
/// embedding and answer extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Stable identifier (`chunk_<page>_<seq>`).
    pub id: String,
    /// Extracted text, at most the configured bound except for the final
    /// remainder segment of a page.
    pub content: String,
    /// Embedding vector, populated asynchronously after segmentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Links discovered on the page that produced this chunk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<UrlNode>,
    /// Identifier of the parent page.
    pub parent_page_id: String,
}

// ---------------------------------------------------------------------------
// UrlMetadata
// ---------------------------------------------------------------------------

/// Per-question relevance verdict for a single link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkScore {
    /// Relevance in [0, 1].
    pub score: f64,
    /// Short oracle justification.
    pub reasoning: String,
}

/// Anchor metadata collected while walking a page's links.
///
/// Used only transiently during scoring; not persisted beyond a page visit.
#[derive(Debug, Clone)]
pub struct UrlMetadata {
    /// Resolved absolute URL.
    pub url: String,
    /// Content of the `<a>` tag.
    pub text: String,
    /// `title` attribute, if present.
    pub title: Option<String>,
    /// Surrounding text (the parent element's text).
    pub context: String,
    /// Scores per question identifier.
    pub scores: HashMap<String, LinkScore>,
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// A committed answer for one question. Immutable once created; the
/// orchestrator keeps at most one per question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The question this answers.
    pub question_id: String,
    /// Extracted content — a URL or free text.
    pub content: String,
    /// Oracle-estimated confidence in [0, 1]; always above the commit gate.
    pub confidence: f64,
    /// Chunk identifiers used as evidence, primary chunk first.
    pub source_path: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(score: f64, confidence: f64) -> UrlNode {
        UrlNode {
            id: "url_p_0".into(),
            url: Url::parse("https://site.example/a").unwrap(),
            relevance_score: score,
            reasoning: "test".into(),
            question_ids: vec!["01".into()],
            parent_chunk_id: "chunk_p_0".into(),
            visited: false,
            confidence,
        }
    }

    #[test]
    fn priority_combines_relevance_and_confidence() {
        assert_eq!(node(0.5, 0.0).priority(), 0.5);
        assert_eq!(node(0.5, 1.0).priority(), 1.0);
    }

    #[test]
    fn scored_for_matches_question_ids() {
        let n = node(0.5, 0.0);
        assert!(n.scored_for("01"));
        assert!(!n.scored_for("02"));
    }

    #[test]
    fn chunk_serialization_skips_empty_fields() {
        let chunk = ContentChunk {
            id: "chunk_p_0".into(),
            content: "hello".into(),
            embedding: None,
            urls: vec![],
            parent_page_id: "p".into(),
        };
        let json = serde_json::to_string(&chunk).expect("serialize");
        assert!(!json.contains("embedding"));
        assert!(!json.contains("urls"));

        let parsed: ContentChunk = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.id, "chunk_p_0");
        assert!(parsed.embedding.is_none());
    }

    #[test]
    fn answer_roundtrip() {
        let answer = Answer {
            question_id: "02".into(),
            content: "https://site.example/webapp".into(),
            confidence: 0.95,
            source_path: vec!["chunk_p_0".into(), "chunk_q_1".into()],
        };
        let json = serde_json::to_string(&answer).expect("serialize");
        let parsed: Answer = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.content, answer.content);
        assert_eq!(parsed.source_path.len(), 2);
    }
}
