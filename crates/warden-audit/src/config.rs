//! Audit configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the audit trail
pub const DEFAULT_AUDIT_PATH: &str = "warden-audit.jsonl";

/// Configuration for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Path of the JSONL trail
    pub path: PathBuf,

    /// Flush every append to stable storage before returning
    pub sync: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_AUDIT_PATH),
            sync: true,
        }
    }
}

impl AuditConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("audit.path must not be empty".to_string());
        }
        if self.path.is_dir() {
            return Err(format!("audit.path {} is a directory", self.path.display()));
        }
        Ok(())
    }
}
