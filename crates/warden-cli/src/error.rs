//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline could not be assembled
    #[error(transparent)]
    Setup(#[from] warden_pipeline::ConfigError),

    /// A pipeline run failed (audit persist failure)
    #[error("Pipeline run failed: {0}")]
    Pipeline(#[from] warden_pipeline::PipelineError),

    /// Input could not be read
    #[error(transparent)]
    Input(#[from] warden_pipeline::InputError),

    /// Audit trail verification failed
    #[error("Audit trail invalid: {0}")]
    Audit(#[from] warden_audit::AuditError),

    /// HTTP server failed
    #[error(transparent)]
    Server(#[from] warden_router::RouterError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A destructive recommendation was not confirmed
    #[error("Confirmation required: destructive recommendation for '{0}' was not executed")]
    ConfirmationRequired(String),
}
