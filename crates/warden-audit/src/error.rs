//! Audit error types

use thiserror::Error;
use warden_domain::PersistFailure;

/// Errors that can occur while writing or reading the audit trail
#[derive(Error, Debug)]
pub enum AuditError {
    /// Underlying file I/O failed
    #[error("Audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized
    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A line of the trail could not be parsed
    #[error("Corrupt audit line {line}: {reason}")]
    Corrupt {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// The hash chain does not link up
    #[error("Audit chain broken at line {line}: {reason}")]
    ChainBroken {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// An earlier write failed part-way; the trail refuses further appends
    #[error("Audit trail unusable after failed write: {0}")]
    Poisoned(String),
}

impl From<AuditError> for PersistFailure {
    fn from(e: AuditError) -> Self {
        PersistFailure(e.to_string())
    }
}
