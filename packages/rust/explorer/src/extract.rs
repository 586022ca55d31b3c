//! Confidence-gated answer extraction.
//!
//! A chunk goes through a two-step protocol: a lightweight validation call
//! over its first ~100 tokens decides whether it is worth analyzing at all;
//! a valid chunk is then sent to extraction together with similarity-linked
//! context and its high-relevance links. Only a `found` verdict with
//! confidence strictly above the gate produces a committed [`Answer`].
//! Every oracle or format failure degrades to "no answer, log and continue".

use tracing::{debug, warn};

use answerscout_shared::{Answer, ContentChunk, ExploreConfig};
use answerscout_oracle::{AnsweringOracle, EmbeddingOracle};

use crate::cache::ChunkCache;
use crate::proto::{self, ExtractionResponse, ValidationResponse};

/// Number of whitespace tokens of chunk content sent to validation.
const VALIDATION_TOKEN_CAP: usize = 100;

/// Verdict of the lightweight content-validation call.
#[derive(Debug, Clone)]
pub struct Validation {
    pub is_valid: bool,
    pub confidence: f64,
    pub reasoning: String,
}

impl Validation {
    fn rejected(reasoning: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }
}

/// Ask the oracle whether a chunk's content is worth analyzing.
///
/// Fail-soft: any error yields an invalid verdict so the chunk is skipped.
pub async fn validate_chunk(oracle: &dyn AnsweringOracle, content: &str) -> Validation {
    let capped: String = content
        .split_whitespace()
        .take(VALIDATION_TOKEN_CAP)
        .collect::<Vec<_>>()
        .join(" ");

    let prompt = proto::json_prompt(&capped, proto::VALIDATION_FORMAT);
    let raw = match oracle.answer(&prompt, None).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "content validation call failed");
            return Validation::rejected("validation call failed");
        }
    };

    match proto::decode::<ValidationResponse>(&raw) {
        Ok(parsed) => Validation {
            is_valid: parsed.is_valid,
            confidence: parsed.confidence.clamp(0.0, 1.0),
            reasoning: parsed.reasoning,
        },
        Err(e) => {
            warn!(error = %e, "malformed validation response");
            Validation::rejected("malformed validation response")
        }
    }
}

/// Run extraction for one validated chunk against one question.
///
/// Returns a committed answer only when the oracle reports `found` with
/// confidence strictly above the gate. `found_in_url` is preferred over
/// free-text content when both are present, since a URL cited in evidence
/// is itself a plausible answer. Errors degrade to `None`.
pub async fn extract_answer(
    oracle: &dyn AnsweringOracle,
    embedder: &dyn EmbeddingOracle,
    cache: &ChunkCache,
    chunk: &ContentChunk,
    question_id: &str,
    question_text: &str,
    config: &ExploreConfig,
) -> Option<Answer> {
    let similar = match cache
        .find_similar(embedder, &chunk.content, config.similarity_threshold)
        .await
    {
        Ok(similar) => similar,
        Err(e) => {
            warn!(chunk_id = %chunk.id, error = %e, "similarity lookup failed");
            return None;
        }
    };

    let prompt = extraction_prompt(chunk, &similar, question_id, question_text, config);
    let raw = match oracle.answer(&prompt, None).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(chunk_id = %chunk.id, error = %e, "extraction call failed");
            return None;
        }
    };

    let parsed: ExtractionResponse = match proto::decode(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(chunk_id = %chunk.id, error = %e, "malformed extraction response");
            return None;
        }
    };

    let verdict = parsed.answer;
    let confidence = verdict.confidence.clamp(0.0, 1.0);
    if !verdict.found || confidence <= config.answer_confidence_gate {
        debug!(
            chunk_id = %chunk.id,
            found = verdict.found,
            confidence,
            reasoning = %verdict.reasoning,
            "no committed answer from chunk"
        );
        return None;
    }

    let content = if verdict.found_in_url.is_empty() {
        verdict.content
    } else {
        verdict.found_in_url
    };

    let mut source_path = Vec::with_capacity(1 + similar.len());
    source_path.push(chunk.id.clone());
    source_path.extend(similar.into_iter().map(|c| c.id));

    Some(Answer {
        question_id: question_id.to_string(),
        content,
        confidence,
        source_path,
    })
}

fn extraction_prompt(
    chunk: &ContentChunk,
    similar: &[ContentChunk],
    question_id: &str,
    question_text: &str,
    config: &ExploreConfig,
) -> String {
    let related_context: Vec<&str> = similar.iter().map(|c| c.content.as_str()).collect();

    let relevant_urls: String = chunk
        .urls
        .iter()
        .filter(|u| u.scored_for(question_id) && u.relevance_score > config.related_link_floor)
        .map(|u| format!("URL: {} (relevance {:.2}): {}", u.url, u.relevance_score, u.reasoning))
        .collect::<Vec<_>>()
        .join("\n\n");

    let content = format!(
        "Primary content:\n{}\n\n\
Related context:\n{}\n\n\
Found relevant URLs:\n{}\n\n\
IMPORTANT:\n\
1. Only return an answer if it's explicitly found in the content or URLs above\n\
2. Do not make assumptions or generate answers\n\
3. If no clear answer is found, set found=false\n\
4. A URL found in the text might also be an answer, but it's not guaranteed. Check the URLs' metadata for more context.\n\n\
Question:\n{}",
        chunk.content,
        related_context.join("\n---\n"),
        relevant_urls,
        question_text,
    );

    proto::json_prompt(&content, proto::EXTRACTION_FORMAT)
}
