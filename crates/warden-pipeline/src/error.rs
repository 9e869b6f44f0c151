//! Pipeline error types

use std::fmt;
use thiserror::Error;
use warden_domain::PersistFailure;
use warden_gatekeeper::GatekeeperError;

/// Errors that stop a pipeline run
///
/// Everything that can go wrong with one item (source failure, refused
/// confirmation, failed execution) is reported in its `ItemResult`. Only
/// failures of the pipeline's own guarantees surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The audit trail could not persist a record
    #[error(transparent)]
    PersistFailure(#[from] PersistFailure),

    /// The confirmation gate was misused
    #[error("Confirmation gate error: {0}")]
    Gate(#[from] GatekeeperError),
}

/// Configuration loading and assembly errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A component could not be built from its configuration
    #[error("Failed to initialize {component}: {message}")]
    Component {
        /// Which component
        component: &'static str,
        /// Why it failed
        message: String,
    },
}

/// Errors reading a whole input source (file missing, no header, ...)
#[derive(Error, Debug)]
pub enum InputError {
    /// I/O failure
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// CSV-level failure
    #[error("Failed to read CSV: {0}")]
    Csv(String),

    /// Required column absent from the header row
    #[error("CSV header has no '{0}' column")]
    MissingColumn(String),

    /// Scan target is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(String),
}

impl From<csv::Error> for InputError {
    fn from(e: csv::Error) -> Self {
        InputError::Csv(e.to_string())
    }
}

/// One input element that could not be turned into a threat record
///
/// Reported as an `invalid_record` item; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Position label shown in place of a threat id (`row-7`, `item-3`)
    pub label: String,

    /// What was wrong
    pub reason: String,
}

impl RecordError {
    /// Error for a CSV row (1-based line number)
    pub fn row(line: u64, reason: impl Into<String>) -> Self {
        Self {
            label: format!("row-{}", line),
            reason: reason.into(),
        }
    }

    /// Error for an element of a JSON array (1-based position)
    pub fn item(position: usize, reason: impl Into<String>) -> Self {
        Self {
            label: format!("item-{}", position),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.reason)
    }
}

impl std::error::Error for RecordError {}
