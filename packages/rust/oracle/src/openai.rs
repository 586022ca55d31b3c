//! OpenAI-compatible chat-completion and embedding clients.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use answerscout_shared::{Result, ScoutError};

use crate::{AnsweringOracle, EmbeddingOracle};

/// Request timeout for oracle calls.
const ORACLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible API, serving both oracle roles.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    chat_endpoint: String,
    embeddings_endpoint: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiClient {
    /// Build a new client against `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_key: &str,
        base_url: &str,
        chat_model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ScoutError::config("missing oracle API key"));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| ScoutError::config("oracle API key contains invalid characters"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(ORACLE_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build oracle HTTP client: {e}")))?;

        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            chat_endpoint: format!("{base}/chat/completions"),
            embeddings_endpoint: format!("{base}/embeddings"),
            chat_model: chat_model.into(),
            embedding_model: embedding_model.into(),
        })
    }
}

#[async_trait]
impl AnsweringOracle for OpenAiClient {
    async fn answer(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model: &self.chat_model,
            messages,
        };

        let response = self
            .client
            .post(&self.chat_endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoutError::Network(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Network(format!(
                "chat request failed (HTTP {status}): {}",
                truncate(&body, 200)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ScoutError::oracle_format(format!("invalid chat completion response: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ScoutError::oracle_format("chat completion returned no choices"))?;

        debug!(model = %self.chat_model, response_len = content.len(), "oracle answered");
        Ok(content)
    }
}

#[async_trait]
impl EmbeddingOracle for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(&self.embeddings_endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoutError::Network(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Network(format!(
                "embedding request failed (HTTP {status}): {}",
                truncate(&body, 200)
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::oracle_format(format!("invalid embedding response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or_else(|| ScoutError::oracle_format("embedding response contained no vectors"))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
