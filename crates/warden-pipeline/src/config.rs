//! Unified configuration
//!
//! One TOML file configures every component:
//!
//! ```toml
//! [llm]
//! endpoint = "http://localhost:11434"
//! model = "gpt-oss:20b"
//!
//! [gate]
//! policy = "always"
//!
//! [executor]
//! timeout_secs = 45
//!
//! [audit]
//! path = "/var/log/warden/audit.jsonl"
//!
//! [pipeline]
//! mode = "advise"
//! concurrency = 4
//! ```

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use warden_audit::AuditConfig;
use warden_domain::RunMode;
use warden_executor::ExecutorConfig;
use warden_gatekeeper::GateConfig;
use warden_llm::LlmConfig;

/// Default wall-clock limit on one recommendation source call (seconds)
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 60;

/// Default number of batch items in flight
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Execute, or advise only
    pub mode: RunMode,

    /// Limit on one recommendation source call, in seconds
    pub source_timeout_secs: u64,

    /// Batch items processed concurrently
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: RunMode::Execute,
            source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PipelineSettings {
    /// Get the source timeout as a Duration
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.source_timeout_secs == 0 {
            return Err("pipeline.source_timeout_secs must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("pipeline.concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Recommendation source
    pub llm: LlmConfig,

    /// Classifier rules and confirmation policy
    pub gate: GateConfig,

    /// Bounded executor
    pub executor: ExecutorConfig,

    /// Audit trail
    pub audit: AuditConfig,

    /// Orchestrator
    pub pipeline: PipelineSettings,
}

impl WardenConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: WardenConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate().map_err(ConfigError::Invalid)?;
        self.gate.validate().map_err(ConfigError::Invalid)?;
        self.executor.validate().map_err(ConfigError::Invalid)?;
        self.audit.validate().map_err(ConfigError::Invalid)?;
        self.pipeline.validate().map_err(ConfigError::Invalid)?;
        if self.llm.max_retries > 1 && self.llm.timeout_secs >= self.pipeline.source_timeout_secs {
            return Err(ConfigError::Invalid(format!(
                "llm.timeout_secs ({}) must be below pipeline.source_timeout_secs ({}) when llm.max_retries > 1",
                self.llm.timeout_secs, self.pipeline.source_timeout_secs
            )));
        }
        Ok(())
    }
}
