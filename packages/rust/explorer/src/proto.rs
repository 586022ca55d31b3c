//! Oracle call contracts: prompt builders and strict response shapes.
//!
//! Every oracle call site has one expected JSON shape; any deviation is a
//! typed [`ScoutError::OracleFormat`] handled at the call site, never an
//! unchecked cast.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use answerscout_shared::{Result, ScoutError, UrlMetadata};

/// Wrap content in the strict JSON-only instruction used by every structured
/// oracle call.
pub(crate) fn json_prompt(content: &str, format: &str) -> String {
    format!(
        "IMPORTANT: Return ONLY a JSON object. No text before or after. No markdown. \
No code blocks. No explanations.\n\n\
Content to analyze:\n{content}\n\n\
Required JSON format:\n{format}"
    )
}

/// Decode an oracle response against the expected shape.
pub(crate) fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw.trim()).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        ScoutError::oracle_format(format!("{e} (got: {preview})"))
    })
}

// ---------------------------------------------------------------------------
// Link scoring (batched per page)
// ---------------------------------------------------------------------------

/// Build the batched relevance-scoring prompt for one page's links.
pub(crate) fn link_scoring_prompt(question: &str, links: &[UrlMetadata]) -> String {
    let listing: String = links
        .iter()
        .enumerate()
        .map(|(i, meta)| {
            format!(
                "\nURL {}:\n- URL: {}\n- Link text: {}\n- Title: {}\n- Context: {}\n",
                i + 1,
                meta.url,
                meta.text,
                meta.title.as_deref().unwrap_or("none"),
                meta.context,
            )
        })
        .collect();

    format!(
        "Analyze these URLs for answering this question:\n{question}\n\n\
URLs to analyze:\n{listing}\n\
Score each URL's relevance (0-1) for answering the question. Compare URLs to each other.\n\n\
RESPOND WITH RAW JSON ONLY. NO BACKTICKS. NO FORMATTING. EXAMPLE:\n\
{{\"scores\":[{{\"url\":\"https://example.com/page1\",\"relevanceScore\":0.8,\"reasoning\":\"explanation\"}}]}}\n\n\
YOUR RESPONSE:"
    )
}

/// Response shape for the batched link-scoring call.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchScoreResponse {
    pub scores: Vec<ScoredLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoredLink {
    pub url: String,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: f64,
    #[serde(default)]
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Content validation
// ---------------------------------------------------------------------------

/// Expected shape of the lightweight content-validation call.
pub(crate) const VALIDATION_FORMAT: &str = r#"{
  "isValid": boolean,
  "confidence": number_between_0_and_1,
  "reasoning": "brief_explanation"
}"#;

#[derive(Debug, Deserialize)]
pub(crate) struct ValidationResponse {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Answer extraction
// ---------------------------------------------------------------------------

/// Expected shape of the structured extraction call.
pub(crate) const EXTRACTION_FORMAT: &str = r#"{
  "answer": {
    "found": boolean,
    "content": "string_or_empty",
    "confidence": number_between_0_and_1,
    "foundInUrl": "string_or_empty",
    "reasoning": "explanation of why this is or isn't an answer"
  }
}"#;

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractionResponse {
    pub answer: ExtractionAnswer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractionAnswer {
    pub found: bool,
    #[serde(default)]
    pub content: String,
    pub confidence: f64,
    #[serde(rename = "foundInUrl", default)]
    pub found_in_url: String,
    #[serde(default)]
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_prose_around_json() {
        let raw = "Sure! Here is the JSON: {\"isValid\": true}";
        let result: Result<ValidationResponse> = decode(raw);
        assert!(matches!(result, Err(ScoutError::OracleFormat { .. })));
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let raw = "\n  {\"isValid\": true, \"confidence\": 0.9, \"reasoning\": \"ok\"}  \n";
        let parsed: ValidationResponse = decode(raw).expect("decode");
        assert!(parsed.is_valid);
        assert_eq!(parsed.confidence, 0.9);
    }

    #[test]
    fn batch_score_response_parses_camel_case() {
        let raw = r#"{"scores":[{"url":"https://a.example/x","relevanceScore":0.85,"reasoning":"points at contact page"}]}"#;
        let parsed: BatchScoreResponse = decode(raw).expect("decode");
        assert_eq!(parsed.scores.len(), 1);
        assert_eq!(parsed.scores[0].relevance_score, 0.85);
    }

    #[test]
    fn extraction_response_defaults_optional_fields() {
        let raw = r#"{"answer":{"found":false,"confidence":0.1}}"#;
        let parsed: ExtractionResponse = decode(raw).expect("decode");
        assert!(!parsed.answer.found);
        assert!(parsed.answer.content.is_empty());
        assert!(parsed.answer.found_in_url.is_empty());
    }

    #[test]
    fn scoring_prompt_lists_every_link() {
        let links = vec![
            UrlMetadata {
                url: "https://a.example/one".into(),
                text: "One".into(),
                title: Some("First".into()),
                context: "Go to one".into(),
                scores: Default::default(),
            },
            UrlMetadata {
                url: "https://a.example/two".into(),
                text: "Two".into(),
                title: None,
                context: "Go to two".into(),
                scores: Default::default(),
            },
        ];
        let prompt = link_scoring_prompt("Where is the contact page?", &links);
        assert!(prompt.contains("https://a.example/one"));
        assert!(prompt.contains("https://a.example/two"));
        assert!(prompt.contains("Title: First"));
        assert!(prompt.contains("Title: none"));
        assert!(prompt.contains("RAW JSON ONLY"));
    }
}
