//! In-memory audit store

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use warden_domain::{AuditEntry, AuditLog, AuditRecord, PersistFailure};

/// Which appends an in-memory store should reject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Accept everything
    #[default]
    Never,
    /// Reject pre-execution intents
    Intents,
    /// Reject outcome entries
    Outcomes,
    /// Reject every append
    Always,
}

/// Audit store that keeps records in memory
///
/// Clones share the same records. Failure injection lets tests drive the
/// persist-failure paths of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    failure: FailureMode,
}

impl MemoryAuditLog {
    /// Create an empty store that accepts every append
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject appends matching the given mode
    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    /// All accepted records, in append order
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Accepted outcome entries, in append order
    pub fn outcomes(&self) -> Vec<AuditEntry> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.as_outcome().cloned())
            .collect()
    }

    /// Number of accepted outcome entries
    pub fn outcome_count(&self) -> usize {
        self.outcomes().len()
    }

    /// Number of accepted intents
    pub fn intent_count(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches!(r, AuditRecord::Intent(_)))
            .count()
    }

    fn rejects(&self, record: &AuditRecord) -> bool {
        match self.failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::Intents => matches!(record, AuditRecord::Intent(_)),
            FailureMode::Outcomes => matches!(record, AuditRecord::Outcome(_)),
        }
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), PersistFailure> {
        if self.rejects(&record) {
            return Err(PersistFailure(format!(
                "audit store rejected record for {}",
                record.threat_id()
            )));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
