//! Recording stub executor

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warden_domain::{ExecutionResult, Executor, Recommendation, TerminalState};

/// Executor that runs nothing and returns a scripted result
///
/// Records the threat id of every invocation, so tests can assert that
/// unconfirmed recommendations never reach execution.
///
/// # Examples
///
/// ```
/// use warden_executor::StubExecutor;
///
/// let executor = StubExecutor::completed(0, "done");
/// assert_eq!(executor.invocation_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct StubExecutor {
    result: ExecutionResult,
    delay: Option<Duration>,
    invocations: Arc<Mutex<Vec<String>>>,
}

impl StubExecutor {
    /// Stub that reports a completed run
    pub fn completed(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self::with_result(ExecutionResult {
            state: TerminalState::Completed,
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 1,
            detail: None,
        })
    }

    /// Stub that reports a run killed at the time limit
    pub fn timed_out() -> Self {
        Self::with_result(ExecutionResult {
            state: TerminalState::TimedOut,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 45_000,
            detail: Some("killed after 45s".to_string()),
        })
    }

    /// Stub that returns the given result
    pub fn with_result(result: ExecutionResult) -> Self {
        Self {
            result,
            delay: None,
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of execute calls so far
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Threat ids passed to execute, in call order
    pub fn invoked_threats(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }
}

impl Default for StubExecutor {
    fn default() -> Self {
        Self::completed(0, "")
    }
}

#[async_trait]
impl Executor for StubExecutor {
    async fn execute(&self, recommendation: &Recommendation) -> ExecutionResult {
        self.invocations
            .lock()
            .unwrap()
            .push(recommendation.threat_id().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}
