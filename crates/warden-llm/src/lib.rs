//! Warden LLM Recommendation Sources
//!
//! Implementations of the `RecommendationSource` trait from `warden-domain`.
//!
//! # Sources
//!
//! - `MockSource`: Deterministic mock for testing
//! - `OllamaSource`: Local Ollama chat API integration
//!
//! Every source runs raw model output through [`payload::validate_payload`],
//! so callers only ever see a single well-formed payload or a
//! `SourceError::Malformed`.
//!
//! # Examples
//!
//! ```
//! use warden_llm::MockSource;
//! use warden_domain::{RecommendationSource, RunMode, ThreatRecord};
//!
//! let source = MockSource::new("```sh\necho cleaned\n```");
//! let record = ThreatRecord::new("t1").unwrap();
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let rec = rt.block_on(source.recommend(&record, RunMode::Execute)).unwrap();
//! assert_eq!(rec.payload(), "echo cleaned");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod payload;
pub mod prompt;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use warden_domain::{Recommendation, RecommendationSource, RunMode, SourceError, ThreatRecord};

pub use config::LlmConfig;
pub use ollama::OllamaSource;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<LlmError> for SourceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::InvalidResponse(msg) => SourceError::Malformed(msg),
            other => SourceError::Unavailable(other.to_string()),
        }
    }
}

/// Scripted reply for one threat id
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(SourceError),
}

/// Mock recommendation source for deterministic testing
///
/// Returns pre-configured raw responses without any network calls. The
/// raw text goes through the same payload validation as real sources, so
/// an empty or mixed response yields `SourceError::Malformed`.
///
/// # Examples
///
/// ```
/// use warden_llm::MockSource;
/// use warden_domain::SourceError;
///
/// let mut source = MockSource::new("Quarantine the file.");
/// source.add_response("t2", "```sh\nls\n```");
/// source.add_error("t3", SourceError::Unavailable("offline".into()));
/// assert_eq!(source.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    latency: Option<Duration>,
    model: String,
}

impl MockSource {
    /// Create a new MockSource with a fixed raw response for all records
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            latency: None,
            model: "mock".to_string(),
        }
    }

    /// Add a specific raw response for a given threat id
    pub fn add_response(&mut self, threat_id: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(threat_id.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for a specific threat id
    pub fn add_error(&mut self, threat_id: impl Into<String>, error: SourceError) {
        self.responses
            .lock()
            .unwrap()
            .insert(threat_id.into(), MockReply::Fail(error));
    }

    /// Delay every reply, to exercise source timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Report a different model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the number of times recommend was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new("Default mock recommendation")
    }
}

#[async_trait]
impl RecommendationSource for MockSource {
    async fn recommend(
        &self,
        record: &ThreatRecord,
        _mode: RunMode,
    ) -> Result<Recommendation, SourceError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self
            .responses
            .lock()
            .unwrap()
            .get(record.id())
            .cloned()
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()));

        let raw = match reply {
            MockReply::Text(text) => text,
            MockReply::Fail(error) => return Err(error),
        };

        let (payload, kind) = payload::validate_payload(&raw)?;
        Ok(Recommendation::new(record.id(), payload, kind, &self.model))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::PayloadKind;

    fn record(id: &str) -> ThreatRecord {
        ThreatRecord::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_mock_source_default() {
        let source = MockSource::new("Isolate the host.");
        let rec = source.recommend(&record("t1"), RunMode::Advise).await.unwrap();
        assert_eq!(rec.payload(), "Isolate the host.");
        assert_eq!(rec.kind(), &PayloadKind::Advice);
        assert_eq!(rec.threat_id(), "t1");
        assert_eq!(rec.model(), "mock");
    }

    #[tokio::test]
    async fn test_mock_source_specific_responses() {
        let mut source = MockSource::default();
        source.add_response("t1", "```sh\nls /tmp\n```");

        let rec = source.recommend(&record("t1"), RunMode::Execute).await.unwrap();
        assert_eq!(rec.payload(), "ls /tmp");
        assert_eq!(rec.language(), Some("sh"));

        let other = source.recommend(&record("t2"), RunMode::Execute).await.unwrap();
        assert_eq!(other.payload(), "Default mock recommendation");
    }

    #[tokio::test]
    async fn test_mock_source_empty_is_malformed() {
        let source = MockSource::new("");
        let result = source.recommend(&record("t1"), RunMode::Execute).await;
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_mock_source_error() {
        let mut source = MockSource::default();
        source.add_error("t1", SourceError::Unavailable("offline".into()));

        let result = source.recommend(&record("t1"), RunMode::Execute).await;
        assert_eq!(result.unwrap_err(), SourceError::Unavailable("offline".into()));
    }

    #[tokio::test]
    async fn test_mock_source_call_count_shared_by_clones() {
        let source = MockSource::new("ok");
        let clone = source.clone();

        source.recommend(&record("t1"), RunMode::Execute).await.unwrap();
        clone.recommend(&record("t2"), RunMode::Execute).await.unwrap();

        // Both share the same call count due to Arc
        assert_eq!(source.call_count(), 2);
        assert_eq!(clone.call_count(), 2);
    }

    #[test]
    fn test_llm_error_mapping() {
        assert!(matches!(
            SourceError::from(LlmError::InvalidResponse("bad json".into())),
            SourceError::Malformed(_)
        ));
        assert!(matches!(
            SourceError::from(LlmError::ModelNotAvailable("m".into())),
            SourceError::Unavailable(_)
        ));
    }
}
