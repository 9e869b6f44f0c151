//! Executor configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock limit for one execution (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Default capture limit for each of stdout and stderr (bytes)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Default time given to output readers after the child exits or is killed (milliseconds)
pub const DEFAULT_KILL_GRACE_MS: u64 = 500;

/// How to run payloads of one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterSpec {
    /// Program to spawn
    pub program: String,

    /// Arguments placed before the payload, which is passed as the last argument
    #[serde(default)]
    pub args: Vec<String>,
}

impl InterpreterSpec {
    /// Create an interpreter spec
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Interpreters known without configuration, keyed by fence language
fn builtin_interpreters() -> BTreeMap<String, InterpreterSpec> {
    let sh = InterpreterSpec::new("sh", &["-c"]);
    let bash = InterpreterSpec::new("bash", &["-c"]);
    let python = InterpreterSpec::new("python3", &["-c"]);
    let pwsh = InterpreterSpec::new("pwsh", &["-NoProfile", "-NonInteractive", "-Command"]);

    [
        ("sh", sh.clone()),
        ("shell", sh),
        ("bash", bash),
        ("python", python.clone()),
        ("python3", python.clone()),
        ("py", python),
        ("powershell", pwsh.clone()),
        ("pwsh", pwsh.clone()),
        ("ps1", pwsh),
    ]
    .into_iter()
    .map(|(lang, spec)| (lang.to_string(), spec))
    .collect()
}

/// Configuration for the bounded executor
///
/// ```toml
/// [executor]
/// timeout_secs = 45
/// max_output_bytes = 65536
/// working_dir = "/var/lib/warden/work"
///
/// [executor.interpreters.ruby]
/// program = "ruby"
/// args = ["-e"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Wall-clock limit per execution, in seconds
    pub timeout_secs: u64,

    /// Capture limit for each output stream, in bytes
    pub max_output_bytes: usize,

    /// Time given to output readers after exit or kill, in milliseconds
    pub kill_grace_ms: u64,

    /// Working directory for payloads (defaults to the current directory)
    pub working_dir: Option<PathBuf>,

    /// Language used for fenced blocks with no info string
    pub default_language: String,

    /// Additional or overriding interpreters, keyed by fence language
    pub interpreters: BTreeMap<String, InterpreterSpec>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            kill_grace_ms: DEFAULT_KILL_GRACE_MS,
            working_dir: None,
            default_language: "sh".to_string(),
            interpreters: BTreeMap::new(),
        }
    }
}

impl ExecutorConfig {
    /// Get the execution timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the reader grace period as a Duration
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }

    /// Look up the interpreter for a fence language
    ///
    /// Configured entries take precedence over the built-in table.
    pub fn interpreter(&self, language: &str) -> Option<InterpreterSpec> {
        let language = language.to_ascii_lowercase();
        self.interpreters
            .get(&language)
            .cloned()
            .or_else(|| builtin_interpreters().remove(&language))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("executor.timeout_secs must be greater than 0".to_string());
        }
        if self.max_output_bytes == 0 {
            return Err("executor.max_output_bytes must be greater than 0".to_string());
        }
        if self.interpreter(&self.default_language).is_none() {
            return Err(format!(
                "executor.default_language '{}' has no interpreter",
                self.default_language
            ));
        }
        for (language, spec) in &self.interpreters {
            if spec.program.trim().is_empty() {
                return Err(format!(
                    "executor.interpreters.{}.program must not be empty",
                    language
                ));
            }
        }
        if let Some(dir) = &self.working_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "executor.working_dir {} is not a directory",
                    dir.display()
                ));
            }
        }
        Ok(())
    }
}
