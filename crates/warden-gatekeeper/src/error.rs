//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// A rule token is empty after normalization
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// The confirmation gate was asked to resolve twice
    #[error("Confirmation gate already resolved")]
    AlreadyResolved,

    /// Failed to read a rule file
    #[error("Failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a rule file
    #[error("Failed to parse rule TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
