//! Executor error types

use thiserror::Error;

/// Errors raised while setting up an executor
///
/// Failures of a payload at run time are never errors; they are reported
/// in `ExecutionResult`.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Configuration rejected
    #[error("Invalid executor configuration: {0}")]
    InvalidConfig(String),
}
