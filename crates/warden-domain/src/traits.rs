//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and
//! infrastructure. Implementations live in other crates.

use crate::{
    AuditRecord, ConfirmationSignal, ExecutionResult, PersistFailure, Recommendation,
    RiskAssessment, SourceError, ThreatRecord,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How far a pipeline run may go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Full pipeline, executing when the gate permits
    #[default]
    Execute,
    /// Recommend, classify and audit only; never execute
    Advise,
}

/// Produces a recommendation for one threat record
///
/// Implemented by the infrastructure layer (warden-llm)
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Obtain one validated recommendation
    ///
    /// Must return `SourceError::Malformed` for anything that is not a
    /// single well-formed payload, and `SourceError::Unavailable` for
    /// transport failures.
    async fn recommend(
        &self,
        record: &ThreatRecord,
        mode: RunMode,
    ) -> Result<Recommendation, SourceError>;

    /// Identifier of the model behind this source
    fn model(&self) -> &str;
}

/// Runs one confirmed recommendation
///
/// Implemented by the infrastructure layer (warden-executor). Every
/// failure is reported inside the `ExecutionResult`; this call never fails.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute the payload under the implementation's bounds
    async fn execute(&self, recommendation: &Recommendation) -> ExecutionResult;
}

/// Append-only audit store
///
/// Implemented by the infrastructure layer (warden-audit). There is
/// deliberately no update or delete operation.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Fully persist one record, or fail without leaving a partial record
    async fn append(&self, record: AuditRecord) -> Result<(), PersistFailure>;
}

/// Supplies the confirmation answer for one run
///
/// Each run asks exactly one confirmer. Returning `None` means no signal
/// was given, which the gate treats as "not confirmed".
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Ask for confirmation of a classified recommendation
    async fn confirm(
        &self,
        record: &ThreatRecord,
        recommendation: &Recommendation,
        assessment: &RiskAssessment,
    ) -> Option<ConfirmationSignal>;
}
