//! Warden Bounded Executor
//!
//! Implementations of the `Executor` trait from `warden-domain`.
//!
//! # Executors
//!
//! - `ProcessExecutor`: spawns the interpreter for the payload's fence
//!   language under a wall-clock limit, with bounded output capture
//! - `StubExecutor`: runs nothing, records invocations (testing)
//!
//! Every outcome, including a refused or crashed payload, is returned as
//! an `ExecutionResult`. Nothing a payload does can fail the caller.

#![warn(missing_docs)]

mod capture;
mod config;
mod error;
pub mod guard;
mod process;
mod stub;

pub use config::{ExecutorConfig, InterpreterSpec, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_SECS};
pub use error::ExecutorError;
pub use process::ProcessExecutor;
pub use stub::StubExecutor;
