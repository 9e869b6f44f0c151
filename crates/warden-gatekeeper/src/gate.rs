//! Confirmation gate
//!
//! One gate per pipeline run. It starts `Pending` and resolves exactly
//! once. A missing or non-affirmative signal resolves to "not confirmed";
//! no code path defaults to confirmed.

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use warden_domain::{now_millis, ConfirmationDecision, ConfirmationSignal, RiskAssessment};

/// Which runs need an explicit confirmation before execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// Every execution needs confirmation, whatever the tier
    #[default]
    Always,

    /// Only destructive recommendations need confirmation
    DestructiveOnly,
}

impl ConfirmationPolicy {
    /// Whether this policy requires confirmation for the given assessment
    pub fn requires_confirmation(&self, assessment: &RiskAssessment) -> bool {
        match self {
            ConfirmationPolicy::Always => true,
            ConfirmationPolicy::DestructiveOnly => assessment.is_destructive(),
        }
    }
}

impl fmt::Display for ConfirmationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfirmationPolicy::Always => "always",
            ConfirmationPolicy::DestructiveOnly => "destructive_only",
        })
    }
}

/// Gate lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for a signal
    Pending,

    /// Resolved; terminal
    Resolved(ConfirmationDecision),
}

/// Per-run confirmation gate
///
/// # Examples
///
/// ```
/// use warden_gatekeeper::{ConfirmationGate, ConfirmationPolicy};
/// use warden_domain::RiskAssessment;
///
/// let assessment = RiskAssessment::from_triggers(vec![]);
/// let mut gate = ConfirmationGate::new(ConfirmationPolicy::Always);
/// let decision = gate.resolve(&assessment, None).unwrap();
/// assert!(!decision.permits_execution());
/// assert!(gate.resolve(&assessment, None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    policy: ConfirmationPolicy,
    state: GateState,
}

impl ConfirmationGate {
    /// Create a pending gate
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self {
            policy,
            state: GateState::Pending,
        }
    }

    /// Current state
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// The decision, once resolved
    pub fn decision(&self) -> Option<&ConfirmationDecision> {
        match &self.state {
            GateState::Resolved(decision) => Some(decision),
            GateState::Pending => None,
        }
    }

    /// Resolve the gate from an optional signal
    ///
    /// # Errors
    ///
    /// Returns `GatekeeperError::AlreadyResolved` if the gate has already
    /// resolved. The earlier decision is kept.
    pub fn resolve(
        &mut self,
        assessment: &RiskAssessment,
        signal: Option<ConfirmationSignal>,
    ) -> Result<ConfirmationDecision, GatekeeperError> {
        if let GateState::Resolved(_) = self.state {
            return Err(GatekeeperError::AlreadyResolved);
        }

        let required = self.policy.requires_confirmation(assessment);
        let decision = match signal {
            Some(signal) => ConfirmationDecision {
                confirmed: signal.confirmed,
                required,
                source: Some(signal.source),
                actor: Some(signal.actor),
                decided_at: now_millis(),
            },
            None => ConfirmationDecision {
                confirmed: false,
                required,
                source: None,
                actor: None,
                decided_at: now_millis(),
            },
        };

        if decision.permits_execution() {
            info!(
                tier = %assessment.tier,
                confirmed = decision.confirmed,
                actor = decision.actor.as_deref().unwrap_or("-"),
                "Execution permitted"
            );
        } else {
            warn!(
                tier = %assessment.tier,
                policy = %self.policy,
                "Execution not confirmed"
            );
        }

        self.state = GateState::Resolved(decision.clone());
        Ok(decision)
    }
}
