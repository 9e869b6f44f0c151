//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama `/api/chat` endpoint
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff for transient failures only
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use warden_llm::{LlmConfig, OllamaSource};
//!
//! let source = OllamaSource::new(LlmConfig::default()).unwrap();
//! ```

use crate::payload::validate_payload;
use crate::prompt::PromptBuilder;
use crate::{LlmConfig, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use warden_domain::{Recommendation, RecommendationSource, RunMode, SourceError, ThreatRecord};

/// Ollama API recommendation source
///
/// Communicates with a local Ollama instance. Transport failures are
/// retried with exponential backoff; malformed responses are not.
pub struct OllamaSource {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaSource {
    /// Create a new Ollama source
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Client` if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model,
            client,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Send one chat request and return the raw message content
    ///
    /// # Errors
    ///
    /// - `LlmError::Communication` if Ollama is unreachable, answers with a
    ///   non-success status, or drops the body mid-read, after all retries
    /// - `LlmError::ModelNotAvailable` if the model is not pulled
    /// - `LlmError::InvalidResponse` if the response body is not a chat reply
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let request_body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            stream: false,
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        match response.bytes().await {
                            Ok(body) => return decode_chat(&body),
                            Err(e) => {
                                last_error = Some(LlmError::Communication(format!(
                                    "Failed to read response body: {}",
                                    e
                                )));
                            }
                        }
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(attempt = attempts, ?delay, "Ollama request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

/// Extract the message content from a complete chat response body
fn decode_chat(body: &[u8]) -> Result<String, LlmError> {
    serde_json::from_slice::<OllamaChatResponse>(body)
        .map(|chat| chat.message.content)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl RecommendationSource for OllamaSource {
    async fn recommend(
        &self,
        record: &ThreatRecord,
        mode: RunMode,
    ) -> Result<Recommendation, SourceError> {
        let prompt = PromptBuilder::new(record, mode).build();
        debug!(threat_id = record.id(), "Prompt length: {} chars", prompt.user.len());

        let raw = self.chat(&prompt.system, &prompt.user).await?;
        debug!(threat_id = record.id(), "Response length: {} chars", raw.len());

        let (payload, kind) = validate_payload(&raw)?;
        Ok(Recommendation::new(record.id(), payload, kind, &self.model))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
