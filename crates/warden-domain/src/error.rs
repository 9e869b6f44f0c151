//! Error types shared across crate boundaries

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A threat record failed validation
    #[error("Invalid threat record: {0}")]
    InvalidRecord(String),
}

/// Errors from a recommendation source
///
/// The two variants are deliberately distinct: `Unavailable` is transient
/// and may be retried as-is, `Malformed` must not be retried without
/// changing the prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure, timeout, or non-success HTTP status
    #[error("Recommendation source unavailable: {0}")]
    Unavailable(String),

    /// The response was not a single well-formed payload
    #[error("Malformed recommendation: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether the failure is transient and the call may be retried unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }
}

/// The audit store could not fully persist a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audit persist failure: {0}")]
pub struct PersistFailure(pub String);
