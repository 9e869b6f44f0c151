//! Per-item outcomes and batch reports

use crate::{
    ConfirmationDecision, ExecutionResult, Recommendation, RiskAssessment, RiskTier, RiskTrigger,
    TerminalState,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Executed to completion with exit status 0
    Executed,
    /// Executed to completion with a non-zero or missing exit status
    ExecutionFailed,
    /// Killed at the execution time limit
    TimedOut,
    /// Confirmed, but the payload could not be started
    FailedToStart,
    /// The gate resolved without permission to execute
    SkippedNotConfirmed,
    /// Advise mode: classified and audited, never executed
    ClassificationOnly,
    /// The recommendation source could not be reached
    SourceUnavailable,
    /// The recommendation source returned an unusable payload
    MalformedRecommendation,
    /// The input row could not be turned into a threat record
    InvalidRecord,
}

impl ItemStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Executed => "executed",
            ItemStatus::ExecutionFailed => "execution_failed",
            ItemStatus::TimedOut => "timed_out",
            ItemStatus::FailedToStart => "failed_to_start",
            ItemStatus::SkippedNotConfirmed => "skipped_not_confirmed",
            ItemStatus::ClassificationOnly => "classification_only",
            ItemStatus::SourceUnavailable => "source_unavailable",
            ItemStatus::MalformedRecommendation => "malformed_recommendation",
            ItemStatus::InvalidRecord => "invalid_record",
        }
    }

    /// Map an execution result to the status it produces
    pub fn from_execution(result: &ExecutionResult) -> Self {
        match result.state {
            TerminalState::Completed if result.exit_code == Some(0) => ItemStatus::Executed,
            TerminalState::Completed => ItemStatus::ExecutionFailed,
            TerminalState::TimedOut => ItemStatus::TimedOut,
            TerminalState::FailedToStart => ItemStatus::FailedToStart,
        }
    }

    /// Whether this status counts as a failure in batch tallies
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ItemStatus::ExecutionFailed
                | ItemStatus::FailedToStart
                | ItemStatus::SourceUnavailable
                | ItemStatus::MalformedRecommendation
                | ItemStatus::InvalidRecord
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Threat record identifier (or `row-N` for unparseable input rows)
    pub threat_id: String,

    /// Terminal status
    pub status: ItemStatus,

    /// Risk tier, if classification ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<RiskTier>,

    /// Triggers that justify the tier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<RiskTrigger>,

    /// Recommendation payload, if one was obtained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,

    /// Model that produced the recommendation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Gate decision, if the gate was reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<ConfirmationDecision>,

    /// Execution result, if execution was attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,

    /// Human-readable explanation of the outcome
    pub summary: String,

    /// Error text for source and input failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    /// Result for a run that stopped before a recommendation was obtained
    pub fn failed(threat_id: impl Into<String>, status: ItemStatus, error: impl Into<String>) -> Self {
        let threat_id = threat_id.into();
        let error = error.into();
        Self {
            summary: format!("{}: {} ({})", threat_id, status, error),
            threat_id,
            status,
            tier: None,
            triggers: Vec::new(),
            recommendation: None,
            model: None,
            decision: None,
            execution: None,
            error: Some(error),
        }
    }

    /// Result for a run that obtained and classified a recommendation
    pub fn assessed(
        recommendation: &Recommendation,
        assessment: &RiskAssessment,
        decision: &ConfirmationDecision,
        status: ItemStatus,
        execution: Option<ExecutionResult>,
    ) -> Self {
        let summary = summarize(recommendation.threat_id(), assessment, decision, status, execution.as_ref());
        Self {
            threat_id: recommendation.threat_id().to_string(),
            status,
            tier: Some(assessment.tier),
            triggers: assessment.triggers.clone(),
            recommendation: Some(recommendation.payload().to_string()),
            model: Some(recommendation.model().to_string()),
            decision: Some(decision.clone()),
            execution,
            summary,
            error: None,
        }
    }

    /// A destructive recommendation was stopped for lack of confirmation
    ///
    /// This is the documented "confirmation required" failure mode that
    /// transports must surface distinctly.
    pub fn requires_confirmation(&self) -> bool {
        self.status == ItemStatus::SkippedNotConfirmed && self.tier == Some(RiskTier::Destructive)
    }
}

fn summarize(
    threat_id: &str,
    assessment: &RiskAssessment,
    decision: &ConfirmationDecision,
    status: ItemStatus,
    execution: Option<&ExecutionResult>,
) -> String {
    let triggers = if assessment.triggers.is_empty() {
        String::new()
    } else {
        let tokens: Vec<&str> = assessment.triggers.iter().map(|t| t.token.as_str()).collect();
        format!(" [{}]", tokens.join(", "))
    };
    let head = format!("{}: {}{}", threat_id, assessment.tier, triggers);

    match status {
        ItemStatus::SkippedNotConfirmed if assessment.is_destructive() => format!(
            "{}; destructive recommendation requires explicit confirmation, nothing executed",
            head
        ),
        ItemStatus::SkippedNotConfirmed => {
            format!("{}; execution requires explicit confirmation, nothing executed", head)
        }
        ItemStatus::ClassificationOnly => format!(
            "{}; advise mode, confirmed={}, nothing executed",
            head, decision.confirmed
        ),
        _ => match execution {
            Some(result) => match result.state {
                TerminalState::Completed => format!(
                    "{}; executed, exit status {} after {} ms",
                    head,
                    result
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                    result.duration_ms
                ),
                TerminalState::TimedOut => {
                    format!("{}; execution timed out after {} ms", head, result.duration_ms)
                }
                TerminalState::FailedToStart => format!(
                    "{}; execution failed to start: {}",
                    head,
                    result.detail.as_deref().unwrap_or("unknown reason")
                ),
            },
            None => format!("{}; {}", head, status),
        },
    }
}

/// Aggregate counts over a batch report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    /// Items in the batch
    pub total: usize,
    /// Items with an explicit affirmative confirmation
    pub confirmed: usize,
    /// Items skipped for lack of confirmation
    pub skipped: usize,
    /// Items executed successfully
    pub executed: usize,
    /// Items that failed (source, input, start or non-zero exit)
    pub failed: usize,
    /// Items killed at the time limit
    pub timed_out: usize,
    /// Items handled in advise mode
    pub classification_only: usize,
}

impl BatchCounts {
    /// Tally counts over a slice of results
    pub fn tally(items: &[ItemResult]) -> Self {
        let mut counts = BatchCounts {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            if item.decision.as_ref().is_some_and(|d| d.confirmed) {
                counts.confirmed += 1;
            }
            match item.status {
                ItemStatus::Executed => counts.executed += 1,
                ItemStatus::TimedOut => counts.timed_out += 1,
                ItemStatus::SkippedNotConfirmed => counts.skipped += 1,
                ItemStatus::ClassificationOnly => counts.classification_only += 1,
                status if status.is_failure() => counts.failed += 1,
                _ => {}
            }
        }
        counts
    }
}

/// Ordered outcomes of one batch run, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-item results, one per input item, in input order
    pub items: Vec<ItemResult>,

    /// Aggregate counts
    pub counts: BatchCounts,

    /// Batch start, milliseconds since the Unix epoch
    pub started_at: u64,

    /// Batch end, milliseconds since the Unix epoch
    pub finished_at: u64,
}

impl BatchReport {
    /// Build a report; counts are derived from the items
    pub fn new(items: Vec<ItemResult>, started_at: u64, finished_at: u64) -> Self {
        let counts = BatchCounts::tally(&items);
        Self {
            items,
            counts,
            started_at,
            finished_at,
        }
    }

    /// Human-readable one-line summary of the counts
    pub fn summary(&self) -> String {
        let c = &self.counts;
        format!(
            "{} item(s): {} executed, {} skipped, {} failed, {} timed out, {} classification-only ({} confirmed)",
            c.total, c.executed, c.skipped, c.failed, c.timed_out, c.classification_only, c.confirmed
        )
    }
}
