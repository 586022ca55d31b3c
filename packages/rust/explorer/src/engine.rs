//! The exploration orchestrator.
//!
//! Drives the per-question loop: seed, dequeue, fetch, segment, validate,
//! extract, enqueue children. Each question owns a fresh
//! [`ExplorationState`] (visited set, frontier, chunk cache, committed
//! answer); nothing survives the reset between questions. Pages are visited
//! strictly one at a time — the only internal fan-out is embedding the
//! chunks of a single page concurrently, which have no data dependency on
//! each other.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use url::Url;

use answerscout_shared::{Answer, ExploreConfig, QuestionSet};
use answerscout_oracle::{AnsweringOracle, EmbeddingOracle, PageFetcher};

use crate::cache::ChunkCache;
use crate::events::{ExploreEvent, RecordedEvent, StateSnapshot, log_event};
use crate::extract;
use crate::frontier::Frontier;
use crate::links;
use crate::segment::segment_page;

// ---------------------------------------------------------------------------
// Per-question state
// ---------------------------------------------------------------------------

/// Lifecycle of one question's exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Frontier and visited set empty; the site root is the next node.
    Seeded,
    /// The dequeue/fetch/extract loop is running.
    Exploring,
    /// A confident answer was committed.
    Answered,
    /// Frontier emptied or the page budget ran out without an answer.
    Exhausted,
}

/// All per-question mutable data. Created fresh for each question and
/// discarded afterwards; never shared across questions.
#[derive(Debug)]
pub struct ExplorationState {
    pub phase: Phase,
    pub visited: HashSet<String>,
    pub frontier: Frontier,
    pub cache: ChunkCache,
    pub answer: Option<Answer>,
    pub pages_explored: usize,
    pub events: Vec<RecordedEvent>,
}

impl ExplorationState {
    fn new() -> Self {
        Self {
            phase: Phase::Seeded,
            visited: HashSet::new(),
            frontier: Frontier::new(),
            cache: ChunkCache::new(),
            answer: None,
            pages_explored: 0,
            events: Vec::new(),
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            queue_size: self.frontier.len(),
            visited: self.visited.len(),
            cached_chunks: self.cache.len(),
            pages_explored: self.pages_explored,
        }
    }

    fn record(&mut self, question_id: &str, event: ExploreEvent) {
        log_event(question_id, &event, self.snapshot());
        self.events.push(RecordedEvent::now(event));
    }

    /// Whether the committed answer clears the confidence gate.
    fn has_confident_answer(&self, gate: f64) -> bool {
        self.answer
            .as_ref()
            .is_some_and(|answer| answer.confidence > gate)
    }
}

/// Terminal result of exploring one question.
#[derive(Debug, Clone)]
pub enum QuestionOutcome {
    /// A confident answer was committed after `pages_explored` visits.
    Answered {
        answer: Answer,
        pages_explored: usize,
    },
    /// The frontier emptied or the budget ran out.
    Exhausted { pages_explored: usize },
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

/// The exploration orchestrator: owns the collaborators and the run config.
pub struct Explorer {
    oracle: Arc<dyn AnsweringOracle>,
    embedder: Arc<dyn EmbeddingOracle>,
    fetcher: Arc<dyn PageFetcher>,
    config: ExploreConfig,
}

impl Explorer {
    /// Construct an explorer over the given collaborators.
    pub fn new(
        oracle: Arc<dyn AnsweringOracle>,
        embedder: Arc<dyn EmbeddingOracle>,
        fetcher: Arc<dyn PageFetcher>,
        config: ExploreConfig,
    ) -> Self {
        Self {
            oracle,
            embedder,
            fetcher,
            config,
        }
    }

    /// Explore all questions sequentially and aggregate the final report:
    /// question identifier → answer content. Questions that exhausted their
    /// budget without a committed answer are absent from the map.
    #[instrument(skip_all, fields(site = %self.config.site_root, questions = questions.len()))]
    pub async fn explore(&self, questions: &QuestionSet) -> BTreeMap<String, String> {
        let mut report = BTreeMap::new();

        for (question_id, question_text) in questions {
            match self.explore_question(question_id, question_text).await {
                QuestionOutcome::Answered {
                    answer,
                    pages_explored,
                } => {
                    info!(
                        question_id,
                        confidence = answer.confidence,
                        pages_explored,
                        "question answered"
                    );
                    report.insert(question_id.clone(), answer.content);
                }
                QuestionOutcome::Exhausted { pages_explored } => {
                    info!(question_id, pages_explored, "question exhausted without answer");
                }
            }
        }

        report
    }

    /// Run the SEEDED → EXPLORING → {ANSWERED | EXHAUSTED} loop for one
    /// question with fresh state.
    #[instrument(skip_all, fields(question_id))]
    pub async fn explore_question(
        &self,
        question_id: &str,
        question_text: &str,
    ) -> QuestionOutcome {
        let mut state = ExplorationState::new();
        info!(question_id, question = question_text, "starting exploration");

        // Mandatory first visit: the seed counts against the page budget.
        state.phase = Phase::Exploring;
        let seed = self.config.site_root.clone();
        self.explore_url(&mut state, &seed, question_id, question_text)
            .await;

        while !state.has_confident_answer(self.config.answer_confidence_gate)
            && !state.frontier.is_empty()
            && state.pages_explored < self.config.max_pages_per_question
        {
            let Some(node) = state.frontier.dequeue() else {
                break;
            };
            self.explore_url(&mut state, &node.url, question_id, question_text)
                .await;
        }

        match state.answer.take() {
            Some(answer) if answer.confidence > self.config.answer_confidence_gate => {
                state.phase = Phase::Answered;
                QuestionOutcome::Answered {
                    answer,
                    pages_explored: state.pages_explored,
                }
            }
            _ => {
                state.phase = Phase::Exhausted;
                QuestionOutcome::Exhausted {
                    pages_explored: state.pages_explored,
                }
            }
        }
    }

    /// Explore a single page: fetch, segment, embed, validate, extract, and
    /// enqueue outgoing links. Every failure is page-local; the caller's
    /// loop continues with the next frontier node.
    async fn explore_url(
        &self,
        state: &mut ExplorationState,
        url: &Url,
        question_id: &str,
        question_text: &str,
    ) {
        state.record(
            question_id,
            ExploreEvent::Visit {
                url: url.to_string(),
            },
        );

        if !state.visited.insert(url.to_string()) {
            state.record(
                question_id,
                ExploreEvent::Yield {
                    reason: "URL already visited".into(),
                    url: Some(url.to_string()),
                },
            );
            return;
        }
        state.pages_explored += 1;

        state.record(
            question_id,
            ExploreEvent::Scrape {
                url: url.to_string(),
            },
        );
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                state.record(
                    question_id,
                    ExploreEvent::Yield {
                        reason: format!("fetch failed: {e}"),
                        url: Some(url.to_string()),
                    },
                );
                return;
            }
        };
        state.record(
            question_id,
            ExploreEvent::Parse {
                url: url.to_string(),
                content_len: html.len(),
            },
        );

        let page_id = page_key(url);
        let mut chunks = segment_page(&html, &page_id, self.config.chunk_max_chars);
        state.record(
            question_id,
            ExploreEvent::Chunks {
                page_id: page_id.clone(),
                count: chunks.len(),
            },
        );

        // Fan-out: embed all chunks of this page concurrently, then wait for
        // all of them. A failed embedding leaves that chunk out of the
        // similarity index but keeps it eligible for extraction.
        let embeddings = join_all(
            chunks
                .iter()
                .map(|chunk| self.embedder.embed(&chunk.content)),
        )
        .await;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            match embedding {
                Ok(vector) => chunk.embedding = Some(vector),
                Err(e) => warn!(chunk_id = %chunk.id, error = %e, "embedding failed"),
            }
        }
        for chunk in &chunks {
            state.cache.insert(chunk.clone());
        }

        // Check page content for answers before spending oracle calls on
        // link scoring; stop early within the page on a committed answer.
        for chunk in &chunks {
            let validation = extract::validate_chunk(self.oracle.as_ref(), &chunk.content).await;
            state.record(
                question_id,
                ExploreEvent::Validate {
                    chunk_id: chunk.id.clone(),
                    is_valid: validation.is_valid,
                    confidence: validation.confidence,
                },
            );
            if !validation.is_valid {
                continue;
            }

            match extract::extract_answer(
                self.oracle.as_ref(),
                self.embedder.as_ref(),
                &state.cache,
                chunk,
                question_id,
                question_text,
                &self.config,
            )
            .await
            {
                Some(answer) => {
                    state.record(
                        question_id,
                        ExploreEvent::Answer {
                            question_id: question_id.to_string(),
                            preview: answer.content.chars().take(100).collect(),
                            confidence: answer.confidence,
                        },
                    );
                    // A later, higher-confidence answer would overwrite; in
                    // practice exploration for this question stops here.
                    state.answer = Some(answer);
                    return;
                }
                None => {
                    state.record(
                        question_id,
                        ExploreEvent::Reason {
                            context: format!("no committed answer from {}", chunk.id),
                        },
                    );
                }
            }
        }

        // No answer on this page: discover and score its outgoing links.
        let nodes = links::extract_and_score(
            self.oracle.as_ref(),
            &html,
            &page_id,
            question_id,
            question_text,
            &self.config.site_root,
            self.config.enqueue_floor,
        )
        .await;
        state.cache.attach_links(&page_id, &nodes);

        for node in nodes {
            if !state.visited.contains(node.url.as_str()) {
                state.frontier.enqueue(node);
            }
        }
    }
}

/// Stable page identifier: a short hash of the URL.
fn page_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    hex
}
