//! Confirmation module - explicit, attributable consent to execute

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a confirmation signal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationSource {
    /// Interactive yes/no prompt (single-target CLI mode)
    Interactive,
    /// `--yes` flag of a single-target CLI command
    CliFlag,
    /// `confirm` field of a single-item request
    RequestFlag,
    /// `confirm` field or flag of a batch run
    BatchFlag,
}

impl fmt::Display for ConfirmationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfirmationSource::Interactive => "interactive",
            ConfirmationSource::CliFlag => "cli_flag",
            ConfirmationSource::RequestFlag => "request_flag",
            ConfirmationSource::BatchFlag => "batch_flag",
        })
    }
}

/// An explicit confirmation answer supplied for one run
///
/// `confirmed` is a required field with no default: a signal can only be
/// built by stating the answer. The absence of a signal is handled by the
/// gate as "not confirmed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSignal {
    /// The answer
    pub confirmed: bool,

    /// Channel the answer arrived on
    pub source: ConfirmationSource,

    /// Who or what supplied the answer (user name, client address, ...)
    pub actor: String,
}

impl ConfirmationSignal {
    /// Build a signal
    pub fn new(confirmed: bool, source: ConfirmationSource, actor: impl Into<String>) -> Self {
        Self {
            confirmed,
            source,
            actor: actor.into(),
        }
    }
}

/// The resolved state of the confirmation gate for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDecision {
    /// An explicit affirmative signal was received
    pub confirmed: bool,

    /// Whether execution needs `confirmed` under the active policy
    pub required: bool,

    /// Channel of the signal, `None` if no signal was supplied
    pub source: Option<ConfirmationSource>,

    /// Who supplied the signal, `None` if no signal was supplied
    pub actor: Option<String>,

    /// When the gate resolved, milliseconds since the Unix epoch
    pub decided_at: u64,
}

impl ConfirmationDecision {
    /// Whether the pipeline may proceed to execution
    ///
    /// Execution is permitted only with an explicit confirmation, or when
    /// the active policy does not require one for this run.
    pub fn permits_execution(&self) -> bool {
        self.confirmed || !self.required
    }
}
