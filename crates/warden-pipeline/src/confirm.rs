//! Non-interactive confirmers

use async_trait::async_trait;
use warden_domain::{
    ConfirmationSignal, ConfirmationSource, Confirmer, Recommendation, RiskAssessment,
    ThreatRecord,
};

/// Interpret a loosely-typed confirmation field
///
/// Only the literal `true` confirms. A missing or `null` field means no
/// signal was given; any other value (`"yes"`, `1`, `"true"`) is an
/// explicit non-affirmative answer.
///
/// # Examples
///
/// ```
/// use warden_pipeline::confirm::confirmation_flag;
/// use serde_json::json;
///
/// assert_eq!(confirmation_flag(Some(&json!(true))), Some(true));
/// assert_eq!(confirmation_flag(Some(&json!("true"))), Some(false));
/// assert_eq!(confirmation_flag(None), None);
/// ```
pub fn confirmation_flag(value: Option<&serde_json::Value>) -> Option<bool> {
    match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Bool(b)) => Some(*b),
        Some(_) => Some(false),
    }
}

/// Confirmer with an answer fixed before the run starts
///
/// Used for request flags, batch flags and `--yes`. The same answer is
/// given for every item it is asked about.
#[derive(Debug, Clone)]
pub struct PresetConfirmation {
    answer: Option<bool>,
    source: ConfirmationSource,
    actor: String,
}

impl PresetConfirmation {
    /// Confirmer that gives `answer` (or no signal for `None`)
    pub fn new(answer: Option<bool>, source: ConfirmationSource, actor: impl Into<String>) -> Self {
        Self {
            answer,
            source,
            actor: actor.into(),
        }
    }

    /// Confirmer that never gives a signal
    pub fn absent() -> Self {
        Self::new(None, ConfirmationSource::BatchFlag, "none")
    }

    /// Build from a raw JSON confirmation field
    pub fn from_flag(
        value: Option<&serde_json::Value>,
        source: ConfirmationSource,
        actor: impl Into<String>,
    ) -> Self {
        Self::new(confirmation_flag(value), source, actor)
    }

    /// The preset answer
    pub fn answer(&self) -> Option<bool> {
        self.answer
    }
}

#[async_trait]
impl Confirmer for PresetConfirmation {
    async fn confirm(
        &self,
        _record: &ThreatRecord,
        _recommendation: &Recommendation,
        _assessment: &RiskAssessment,
    ) -> Option<ConfirmationSignal> {
        self.answer
            .map(|confirmed| ConfirmationSignal::new(confirmed, self.source, self.actor.clone()))
    }
}
