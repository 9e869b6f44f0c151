//! Execution results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of a bounded execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    /// The process ran and exited on its own (any exit status)
    Completed,
    /// The process was killed at the wall-clock limit
    TimedOut,
    /// Nothing was executed: bad payload, refused payload, or spawn error
    FailedToStart,
}

impl TerminalState {
    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalState::Completed => "completed",
            TerminalState::TimedOut => "timed_out",
            TerminalState::FailedToStart => "failed_to_start",
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one confirmed recommendation
///
/// Failures of the remediation itself are data here, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Terminal state
    pub state: TerminalState,

    /// Exit code, when the process exited normally
    pub exit_code: Option<i32>,

    /// Captured standard output (lossy UTF-8, length-bounded)
    pub stdout: String,

    /// Captured standard error (lossy UTF-8, length-bounded)
    pub stderr: String,

    /// Standard output exceeded the capture limit
    #[serde(default)]
    pub stdout_truncated: bool,

    /// Standard error exceeded the capture limit
    #[serde(default)]
    pub stderr_truncated: bool,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,

    /// Why execution failed to start, or how it ended abnormally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExecutionResult {
    /// Result for a payload that was never started
    pub fn failed_to_start(reason: impl Into<String>) -> Self {
        Self {
            state: TerminalState::FailedToStart,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 0,
            detail: Some(reason.into()),
        }
    }

    /// Whether the remediation ran to completion with exit status 0
    pub fn succeeded(&self) -> bool {
        self.state == TerminalState::Completed && self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_to_start() {
        let result = ExecutionResult::failed_to_start("unknown language");
        assert_eq!(result.state, TerminalState::FailedToStart);
        assert_eq!(result.detail.as_deref(), Some("unknown language"));
        assert!(!result.succeeded());
    }

    #[test]
    fn test_completed_nonzero_is_not_success() {
        let result = ExecutionResult {
            state: TerminalState::Completed,
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "no such file".into(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 12,
            detail: None,
        };
        assert!(!result.succeeded());
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&TerminalState::TimedOut).unwrap(),
            "\"timed_out\""
        );
    }
}
