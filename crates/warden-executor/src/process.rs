//! Process-backed bounded executor
//!
//! Runs a code payload through the interpreter for its fence language,
//! as a child process of the current one. The child inherits no
//! privileges beyond ours, gets a cleared environment and no stdin, and
//! is killed at the wall-clock limit. On unix the child leads its own
//! process group, and the whole group is killed, so anything the payload
//! forked dies with it.

use crate::capture::CaptureBuffer;
use crate::guard::escalation_command;
use crate::{ExecutorConfig, ExecutorError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use warden_domain::{ExecutionResult, Executor, PayloadKind, Recommendation, TerminalState};

/// Environment variables passed through to the child
const PASSTHROUGH_ENV: &[&str] = &["PATH", "HOME", "LANG"];

/// Executor that spawns an interpreter per payload
///
/// # Examples
///
/// ```no_run
/// use warden_executor::{ExecutorConfig, ProcessExecutor};
///
/// let executor = ProcessExecutor::new(ExecutorConfig::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: ExecutorConfig,
    timeout: Duration,
}

impl ProcessExecutor {
    /// Create an executor
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::InvalidConfig` if the configuration does
    /// not validate.
    pub fn new(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate().map_err(ExecutorError::InvalidConfig)?;
        Ok(Self {
            timeout: config.timeout(),
            config,
        })
    }

    /// Override the wall-clock limit
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Active wall-clock limit
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, recommendation: &Recommendation) -> Result<Command, String> {
        let language = match recommendation.kind() {
            PayloadKind::Advice => {
                return Err("advice payload has no executable body".to_string());
            }
            PayloadKind::Code { language } => language
                .as_deref()
                .unwrap_or(&self.config.default_language),
        };

        let interpreter = self
            .config
            .interpreter(language)
            .ok_or_else(|| format!("no interpreter for language '{}'", language))?;

        if let Some(cmd) = escalation_command(recommendation.payload()) {
            return Err(format!("privilege escalation refused: payload invokes '{}'", cmd));
        }

        let mut command = Command::new(&interpreter.program);
        command
            .args(&interpreter.args)
            .arg(recommendation.payload())
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        for key in PASSTHROUGH_ENV {
            if let Ok(value) = std::env::var(key) {
                command.env(key, value);
            }
        }
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        Ok(command)
    }

    /// Give a reader task the grace period to finish, then abort it
    async fn settle(&self, handle: Option<JoinHandle<()>>) {
        if let Some(mut handle) = handle {
            if tokio::time::timeout(self.config.kill_grace(), &mut handle)
                .await
                .is_err()
            {
                handle.abort();
            }
        }
    }
}

/// Kill the child's process group, then the child itself, and reap it
async fn kill_tree(child: &mut Child, threat_id: &str) {
    #[cfg(unix)]
    {
        if let Some(pgid) = child.id() {
            let status = Command::new("kill")
                .arg("-KILL")
                .arg("--")
                .arg(format!("-{}", pgid))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            match status {
                Ok(status) if status.success() => {}
                Ok(status) => warn!(threat_id, pgid, %status, "Process group kill reported failure"),
                Err(e) => warn!(threat_id, pgid, error = %e, "Failed to run kill for process group"),
            }
        }
    }

    if let Err(e) = child.start_kill() {
        warn!(threat_id, error = %e, "Failed to kill timed-out child");
    }
    if let Err(e) = child.wait().await {
        warn!(threat_id, error = %e, "Failed to reap timed-out child");
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, recommendation: &Recommendation) -> ExecutionResult {
        let threat_id = recommendation.threat_id();

        let mut command = match self.command(recommendation) {
            Ok(command) => command,
            Err(reason) => {
                warn!(threat_id, %reason, "Execution refused");
                return ExecutionResult::failed_to_start(reason);
            }
        };

        let start = Instant::now();
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(threat_id, error = %e, "Failed to spawn interpreter");
                return ExecutionResult::failed_to_start(format!("spawn failed: {}", e));
            }
        };
        info!(threat_id, pid = ?child.id(), "Execution started");

        let limit = self.config.max_output_bytes;
        let stdout = CaptureBuffer::default();
        let stderr = CaptureBuffer::default();
        let stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(stdout.clone().drain(pipe, limit)));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(stderr.clone().drain(pipe, limit)));

        let (state, exit_code, detail) = match tokio::time::timeout(self.timeout, child.wait()).await
        {
            Ok(Ok(status)) => {
                let detail = match status.code() {
                    Some(_) => None,
                    None => Some(format!("terminated abnormally: {}", status)),
                };
                (TerminalState::Completed, status.code(), detail)
            }
            Ok(Err(e)) => (
                TerminalState::Completed,
                None,
                Some(format!("failed waiting for child: {}", e)),
            ),
            Err(_) => {
                kill_tree(&mut child, threat_id).await;
                warn!(threat_id, timeout = ?self.timeout, "Execution timed out");
                (
                    TerminalState::TimedOut,
                    None,
                    Some(format!("killed after {:?}", self.timeout)),
                )
            }
        };

        self.settle(stdout_task).await;
        self.settle(stderr_task).await;

        let (stdout, stdout_truncated) = stdout.finish();
        let (stderr, stderr_truncated) = stderr.finish();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            threat_id,
            state = %state,
            exit_code = ?exit_code,
            duration_ms,
            "Execution finished"
        );

        ExecutionResult {
            state,
            exit_code,
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
            duration_ms,
            detail,
        }
    }
}
