//! Closed set of exploration events and their structured logger.
//!
//! Every observable action the orchestrator takes is one of these variants;
//! a single logging sink serializes the variant and attaches a snapshot of
//! the exploration state, which keeps debug output uniform across the loop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// One observable action taken during exploration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExploreEvent {
    /// A node was selected for exploration.
    Visit { url: String },
    /// The page body is being fetched.
    Scrape { url: String },
    /// Markup was fetched and is about to be segmented.
    Parse { url: String, content_len: usize },
    /// Segmentation finished for a page.
    Chunks { page_id: String, count: usize },
    /// A chunk passed (or failed) content validation.
    Validate {
        chunk_id: String,
        is_valid: bool,
        confidence: f64,
    },
    /// Extraction ran but produced no committed answer.
    Reason { context: String },
    /// An answer cleared the confidence gate and was committed.
    Answer {
        question_id: String,
        preview: String,
        confidence: f64,
    },
    /// A branch was abandoned (dedup hit, fetch failure, oracle failure).
    Yield {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

/// An event paired with the moment it was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: ExploreEvent,
}

impl RecordedEvent {
    pub fn now(event: ExploreEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}

/// Counters attached to every logged event.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StateSnapshot {
    pub queue_size: usize,
    pub visited: usize,
    pub cached_chunks: usize,
    pub pages_explored: usize,
}

/// Emit one event with its state snapshot through `tracing`.
pub fn log_event(question_id: &str, event: &ExploreEvent, snapshot: StateSnapshot) {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| format!("{event:?}"));
    info!(
        target: "answerscout::events",
        question_id,
        event = %payload,
        queue_size = snapshot.queue_size,
        visited = snapshot.visited,
        cached_chunks = snapshot.cached_chunks,
        pages_explored = snapshot.pages_explored,
        "explore event"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ExploreEvent::Visit {
            url: "https://site.example/".into(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"visit""#));

        let event = ExploreEvent::Answer {
            question_id: "01".into(),
            preview: "found it".into(),
            confidence: 0.92,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"answer""#));
        assert!(json.contains("0.92"));
    }

    #[test]
    fn yield_without_url_omits_field() {
        let event = ExploreEvent::Yield {
            reason: "frontier empty".into(),
            url: None,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(!json.contains("url"));
    }

    #[test]
    fn recorded_event_flattens_payload() {
        let recorded = RecordedEvent::now(ExploreEvent::Chunks {
            page_id: "p".into(),
            count: 3,
        });
        let json = serde_json::to_string(&recorded).expect("serialize");
        assert!(json.contains(r#""type":"chunks""#));
        assert!(json.contains(r#""at""#));
    }
}
