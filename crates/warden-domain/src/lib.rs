//! Warden Domain Layer
//!
//! Core data model for the safety-gated remediation pipeline. Every other
//! crate in the workspace depends on the types and seams defined here.
//!
//! ## Key Concepts
//!
//! - **ThreatRecord**: one unit of work (a suspected artifact or scan target)
//! - **Recommendation**: the model's proposed remediation for a record
//! - **RiskAssessment**: `benign` or `destructive`, with the triggers that justify it
//! - **ConfirmationDecision**: whether an explicit, attributable confirmation was given
//! - **ExecutionResult**: outcome of a bounded execution, captured as data
//! - **AuditEntry**: the append-only record tying one pipeline run together
//!
//! ## Architecture
//!
//! - Plain data types, immutable once constructed
//! - Trait definitions for every external interaction (LLM, process
//!   execution, audit storage, confirmation prompts)
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod confirmation;
pub mod error;
pub mod execution;
pub mod outcome;
pub mod recommendation;
pub mod risk;
pub mod threat;
pub mod traits;

// Re-exports for convenience
pub use audit::{AuditEntry, AuditRecord, ExecutionIntent, RecommendationRef};
pub use confirmation::{ConfirmationDecision, ConfirmationSignal, ConfirmationSource};
pub use error::{DomainError, PersistFailure, SourceError};
pub use execution::{ExecutionResult, TerminalState};
pub use outcome::{BatchCounts, BatchReport, ItemResult, ItemStatus};
pub use recommendation::{PayloadKind, Recommendation};
pub use risk::{RiskAssessment, RiskCategory, RiskTier, RiskTrigger};
pub use threat::ThreatRecord;
pub use traits::{AuditLog, Confirmer, Executor, RecommendationSource, RunMode};

/// Milliseconds since the Unix epoch.
///
/// Clock errors (a system clock set before 1970) collapse to zero rather
/// than failing the pipeline.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generate a new time-ordered identifier (UUIDv7).
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
