//! Configuration file parsing for the Router.
//!
//! The router reads the same TOML file as the rest of the pipeline, plus
//! a `[server]` table with the bind settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use warden_pipeline::WardenConfig;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid server settings
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),
}

/// `[server]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
        }
    }
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Bind settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Pipeline sections (`[llm]`, `[gate]`, `[executor]`, `[audit]`,
    /// `[pipeline]`)
    #[serde(flatten)]
    pub warden: WardenConfig,
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: RouterConfig = toml::from_str(&contents)?;

        if config.server.bind_address.trim().is_empty() {
            return Err(ConfigError::InvalidServer(
                "server.bind_address must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
    }
}
