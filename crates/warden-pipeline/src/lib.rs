//! Warden Pipeline
//!
//! Orchestrates the remediation pipeline and gathers its inputs.
//!
//! # Components
//!
//! - [`Pipeline`]: single-item and batch runs over source, classifier,
//!   gate, executor and audit trail
//! - [`WardenConfig`]: one TOML file configuring every component
//! - [`PresetConfirmation`]: request-flag and batch-flag confirmers
//! - [`read_threats_csv`] / [`scan_directory`]: record sources
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use warden_audit::MemoryAuditLog;
//! use warden_domain::{ConfirmationSource, ItemStatus};
//! use warden_executor::StubExecutor;
//! use warden_llm::MockSource;
//! use warden_pipeline::{parse_threats_csv, Pipeline, PresetConfirmation};
//!
//! let audit = MemoryAuditLog::new();
//! let pipeline = Pipeline::new(
//!     Arc::new(MockSource::new("```sh\necho scanned\n```")),
//!     Arc::new(StubExecutor::completed(0, "scanned")),
//!     Arc::new(audit.clone()),
//! );
//!
//! let rows = parse_threats_csv("threat_id\nt1\n\nt2\n".as_bytes()).unwrap();
//! let confirm = PresetConfirmation::new(Some(true), ConfirmationSource::BatchFlag, "ops");
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let report = rt.block_on(pipeline.run_batch(rows, &confirm)).unwrap();
//! assert_eq!(report.counts.executed, 2);
//! assert_eq!(audit.outcome_count(), 2);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod confirm;
mod csv_input;
mod error;
mod orchestrator;
pub mod scan;

pub use config::{PipelineSettings, WardenConfig};
pub use confirm::PresetConfirmation;
pub use csv_input::{parse_threats_csv, read_threats_csv};
pub use error::{ConfigError, InputError, PipelineError, RecordError};
pub use orchestrator::Pipeline;
pub use scan::{scan_directory, scan_directory_capped, DEFAULT_MAX_FILES, DEFAULT_MAX_HASH_BYTES};
