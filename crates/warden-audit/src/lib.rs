//! Warden Audit Trail
//!
//! Implementations of the `AuditLog` trait from `warden-domain`.
//!
//! # Stores
//!
//! - `FileAuditLog`: hash-chained JSONL file, owner-only permissions,
//!   appends serialized and synced
//! - `MemoryAuditLog`: in-memory store with failure injection (testing)
//!
//! The trail holds two kinds of record: an `intent` written before any
//! execution, and exactly one `outcome` per pipeline run. Use
//! [`verify_chain`] to check a trail for tampering.
//!
//! # Examples
//!
//! ```
//! use warden_audit::{verify_chain, AuditConfig, FileAuditLog};
//! use warden_domain::{AuditEntry, AuditLog, AuditRecord, ItemStatus, ThreatRecord};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = AuditConfig { path: dir.path().join("audit.jsonl"), sync: false };
//! let log = FileAuditLog::open(&config).unwrap();
//!
//! let entry = AuditEntry::new(ThreatRecord::new("t1").unwrap(), ItemStatus::SkippedNotConfirmed);
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(log.append(AuditRecord::Outcome(entry))).unwrap();
//!
//! assert_eq!(verify_chain(&config.path).unwrap().outcomes, 1);
//! ```

#![warn(missing_docs)]

pub mod chain;
mod config;
mod error;
mod file;
mod memory;

pub use chain::{verify_chain, ChainReport};
pub use config::{AuditConfig, DEFAULT_AUDIT_PATH};
pub use error::AuditError;
pub use file::FileAuditLog;
pub use memory::{FailureMode, MemoryAuditLog};
