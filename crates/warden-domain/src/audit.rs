//! Audit records - the immutable trail of every pipeline decision

use crate::{
    ConfirmationDecision, ExecutionResult, ItemStatus, Recommendation, RiskAssessment, RiskTier,
    ThreatRecord,
};
use serde::{Deserialize, Serialize};

/// Reference to the recommendation a run acted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRef {
    /// SHA-256 hex digest of the payload
    pub digest: String,

    /// Model that produced it
    pub model: String,

    /// The payload itself
    pub payload: String,
}

impl From<&Recommendation> for RecommendationRef {
    fn from(rec: &Recommendation) -> Self {
        Self {
            digest: rec.digest(),
            model: rec.model().to_string(),
            payload: rec.payload().to_string(),
        }
    }
}

/// Pre-execution record
///
/// Written and persisted before anything executes. If this record cannot
/// be persisted the run aborts without executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionIntent {
    /// Unique identifier (UUIDv7)
    pub intent_id: String,

    /// When the intent was recorded, milliseconds since the Unix epoch
    pub recorded_at: u64,

    /// Threat record identifier
    pub threat_id: String,

    /// Digest of the payload about to run
    pub recommendation_digest: String,

    /// Tier at the time of execution
    pub tier: RiskTier,

    /// The decision that permitted execution
    pub decision: ConfirmationDecision,
}

impl ExecutionIntent {
    /// Build an intent for a recommendation about to run
    pub fn new(
        recommendation: &Recommendation,
        assessment: &RiskAssessment,
        decision: &ConfirmationDecision,
    ) -> Self {
        Self {
            intent_id: crate::new_id(),
            recorded_at: crate::now_millis(),
            threat_id: recommendation.threat_id().to_string(),
            recommendation_digest: recommendation.digest(),
            tier: assessment.tier,
            decision: decision.clone(),
        }
    }
}

/// One outcome record per pipeline run
///
/// Ties the threat record, recommendation, assessment, decision and
/// execution result (each if reached) together. Once appended it is never
/// modified or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier (UUIDv7)
    pub entry_id: String,

    /// When the entry was created, milliseconds since the Unix epoch
    pub recorded_at: u64,

    /// The record the run processed
    pub threat: ThreatRecord,

    /// Recommendation, if one was obtained
    pub recommendation: Option<RecommendationRef>,

    /// Classification, if it ran
    pub assessment: Option<RiskAssessment>,

    /// Gate decision, if the gate was reached
    pub decision: Option<ConfirmationDecision>,

    /// Execution result, if execution was attempted
    pub execution: Option<ExecutionResult>,

    /// Terminal status of the run
    pub status: ItemStatus,

    /// Error text or other remarks
    pub note: Option<String>,
}

impl AuditEntry {
    /// Start an entry for a threat record with the given terminal status
    pub fn new(threat: ThreatRecord, status: ItemStatus) -> Self {
        Self {
            entry_id: crate::new_id(),
            recorded_at: crate::now_millis(),
            threat,
            recommendation: None,
            assessment: None,
            decision: None,
            execution: None,
            status,
            note: None,
        }
    }

    /// Attach the recommendation
    pub fn with_recommendation(mut self, recommendation: &Recommendation) -> Self {
        self.recommendation = Some(RecommendationRef::from(recommendation));
        self
    }

    /// Attach the assessment
    pub fn with_assessment(mut self, assessment: &RiskAssessment) -> Self {
        self.assessment = Some(assessment.clone());
        self
    }

    /// Attach the gate decision
    pub fn with_decision(mut self, decision: &ConfirmationDecision) -> Self {
        self.decision = Some(decision.clone());
        self
    }

    /// Attach the execution result
    pub fn with_execution(mut self, execution: &ExecutionResult) -> Self {
        self.execution = Some(execution.clone());
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether the gate recorded an explicit confirmation
    pub fn confirmed(&self) -> bool {
        self.decision.as_ref().is_some_and(|d| d.confirmed)
    }
}

/// Anything written to the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// Pre-execution intent
    Intent(ExecutionIntent),
    /// Per-run outcome
    Outcome(AuditEntry),
}

impl AuditRecord {
    /// Threat record identifier the record refers to
    pub fn threat_id(&self) -> &str {
        match self {
            AuditRecord::Intent(intent) => &intent.threat_id,
            AuditRecord::Outcome(entry) => entry.threat.id(),
        }
    }

    /// The outcome entry, if this is one
    pub fn as_outcome(&self) -> Option<&AuditEntry> {
        match self {
            AuditRecord::Outcome(entry) => Some(entry),
            AuditRecord::Intent(_) => None,
        }
    }
}
