//! Link extraction and oracle relevance scoring.
//!
//! Walks a page's anchors, resolves each `href` against the site root,
//! collects anchor metadata, and asks the answering oracle to score every
//! link's relevance to the current question in a single batched call.
//! Oracle failure or a malformed response degrades to an empty result for
//! the whole page; a single malformed returned URL is skipped with a
//! warning and does not affect sibling links.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use answerscout_shared::{LinkScore, UrlMetadata, UrlNode};
use answerscout_oracle::AnsweringOracle;

use crate::proto::{self, BatchScoreResponse};

/// Collect anchor metadata from raw markup, resolved against `site_root`.
///
/// Fragment-only, `javascript:` and `mailto:` hrefs are skipped, as are
/// hrefs that fail to resolve.
pub fn collect_link_metadata(html: &str, site_root: &Url) -> Vec<UrlMetadata> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("valid anchor selector");
    let mut links = Vec::new();

    for anchor in doc.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:")
        {
            continue;
        }

        let Ok(mut resolved) = site_root.join(href) else {
            debug!(href, "unresolvable href, skipping");
            continue;
        };
        resolved.set_fragment(None);

        links.push(UrlMetadata {
            url: resolved.to_string(),
            text: anchor.text().collect::<String>().trim().to_string(),
            title: anchor.value().attr("title").map(str::to_string),
            context: parent_text(&anchor),
            scores: HashMap::new(),
        });
    }

    links
}

/// Extract this page's links and score them for one question.
///
/// Returns only nodes scoring strictly above `enqueue_floor`, ready for the
/// frontier. Never fails: any oracle or format error yields an empty list.
pub async fn extract_and_score(
    oracle: &dyn AnsweringOracle,
    html: &str,
    page_id: &str,
    question_id: &str,
    question_text: &str,
    site_root: &Url,
    enqueue_floor: f64,
) -> Vec<UrlNode> {
    let mut metadata = collect_link_metadata(html, site_root);
    if metadata.is_empty() {
        return Vec::new();
    }

    let prompt = proto::link_scoring_prompt(question_text, &metadata);
    let response = match oracle.answer(&prompt, None).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(page_id, question_id, error = %e, "link scoring call failed");
            return Vec::new();
        }
    };

    let parsed: BatchScoreResponse = match proto::decode(&response) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(page_id, question_id, error = %e, "malformed link scoring response");
            return Vec::new();
        }
    };

    let mut nodes = Vec::new();
    for scored in parsed.scores {
        let score = scored.relevance_score.clamp(0.0, 1.0);

        // Record the verdict on the metadata entry while it is still around.
        if let Some(meta) = metadata.iter_mut().find(|m| m.url == scored.url) {
            meta.scores.insert(
                question_id.to_string(),
                LinkScore {
                    score,
                    reasoning: scored.reasoning.clone(),
                },
            );
        }

        if score <= enqueue_floor {
            continue;
        }

        let url = match Url::parse(&scored.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %scored.url, error = %e, "invalid URL skipped");
                continue;
            }
        };

        nodes.push(UrlNode {
            id: format!("url_{page_id}_{}", nodes.len()),
            url,
            relevance_score: score,
            reasoning: scored.reasoning,
            question_ids: vec![question_id.to_string()],
            parent_chunk_id: page_id.to_string(),
            visited: false,
            confidence: 0.0,
        });
    }

    nodes
}

fn parent_text(anchor: &ElementRef<'_>) -> String {
    anchor
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use answerscout_shared::Result;

    struct CannedOracle {
        responses: Mutex<Vec<Result<String>>>,
    }

    impl CannedOracle {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl AnsweringOracle for CannedOracle {
        async fn answer(&self, _prompt: &str, _system: Option<&str>) -> Result<String> {
            self.responses
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or_else(|| Ok("{}".into()))
        }
    }

    fn root() -> Url {
        Url::parse("https://site.example").unwrap()
    }

    #[test]
    fn collects_and_resolves_anchors() {
        let html = r##"<body>
            <p>See the <a href="/contact" title="Contact us">contact page</a> for details.</p>
            <a href="https://other.example/page">external</a>
            <a href="#section">anchor</a>
            <a href="mailto:hi@site.example">mail</a>
            <a href="javascript:void(0)">js</a>
        </body>"##;

        let links = collect_link_metadata(html, &root());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://site.example/contact");
        assert_eq!(links[0].text, "contact page");
        assert_eq!(links[0].title.as_deref(), Some("Contact us"));
        assert!(links[0].context.contains("for details"));
        assert_eq!(links[1].url, "https://other.example/page");
    }

    #[tokio::test]
    async fn scores_above_floor_become_nodes() {
        let html = r#"<body><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a></body>"#;
        let response = r#"{"scores":[
            {"url":"https://site.example/a","relevanceScore":0.9,"reasoning":"strong"},
            {"url":"https://site.example/b","relevanceScore":0.3,"reasoning":"at floor"},
            {"url":"https://site.example/c","relevanceScore":0.1,"reasoning":"weak"}
        ]}"#;
        let oracle = CannedOracle::new(vec![Ok(response.into())]);

        let nodes =
            extract_and_score(&oracle, html, "p1", "01", "where?", &root(), 0.3).await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].url.as_str(), "https://site.example/a");
        assert_eq!(nodes[0].relevance_score, 0.9);
        assert_eq!(nodes[0].reasoning, "strong");
        assert_eq!(nodes[0].id, "url_p1_0");
        assert_eq!(nodes[0].confidence, 0.0);
        assert!(!nodes[0].visited);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_clamped() {
        let html = r#"<body><a href="/a">A</a></body>"#;
        let response =
            r#"{"scores":[{"url":"https://site.example/a","relevanceScore":1.7,"reasoning":""}]}"#;
        let oracle = CannedOracle::new(vec![Ok(response.into())]);

        let nodes =
            extract_and_score(&oracle, html, "p1", "01", "where?", &root(), 0.3).await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].relevance_score, 1.0);
    }

    #[tokio::test]
    async fn malformed_returned_url_is_skipped_not_fatal() {
        let html = r#"<body><a href="/a">A</a><a href="/b">B</a></body>"#;
        let response = r#"{"scores":[
            {"url":"not a url","relevanceScore":0.9,"reasoning":""},
            {"url":"https://site.example/b","relevanceScore":0.8,"reasoning":""}
        ]}"#;
        let oracle = CannedOracle::new(vec![Ok(response.into())]);

        let nodes =
            extract_and_score(&oracle, html, "p1", "01", "where?", &root(), 0.3).await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].url.as_str(), "https://site.example/b");
    }

    #[tokio::test]
    async fn oracle_failure_degrades_to_empty() {
        let html = r#"<body><a href="/a">A</a></body>"#;
        let oracle = CannedOracle::new(vec![Err(
            answerscout_shared::ScoutError::Network("boom".into()),
        )]);

        let nodes =
            extract_and_score(&oracle, html, "p1", "01", "where?", &root(), 0.3).await;
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_empty() {
        let html = r#"<body><a href="/a">A</a></body>"#;
        let oracle = CannedOracle::new(vec![Ok("I think page /a is best!".into())]);

        let nodes =
            extract_and_score(&oracle, html, "p1", "01", "where?", &root(), 0.3).await;
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn page_without_links_skips_the_oracle() {
        let oracle = CannedOracle::new(vec![]);
        let nodes = extract_and_score(
            &oracle,
            "<body><p>No links here.</p></body>",
            "p1",
            "01",
            "where?",
            &root(),
            0.3,
        )
        .await;
        assert!(nodes.is_empty());
    }
}
