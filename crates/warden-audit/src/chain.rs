//! Hash chain over the audit trail
//!
//! Each line of the trail is one JSON object:
//!
//! ```text
//! {"seq":0,"prev_hash":"000…","hash":"9f2c…","record":{"kind":"outcome",…}}
//! ```
//!
//! `hash = sha256(prev_hash || json(record))`, hex encoded. The first line
//! links to [`GENESIS_HASH`]. Editing, removing or reordering any line
//! breaks every link after it.

use crate::AuditError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use warden_domain::AuditRecord;

/// `prev_hash` of the first line
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One line of the trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainedLine {
    /// Position in the trail, starting at 0
    pub seq: u64,

    /// Hash of the previous line
    pub prev_hash: String,

    /// Hash of this line
    pub hash: String,

    /// The record, as JSON
    pub record: serde_json::Value,
}

impl ChainedLine {
    /// Link a record onto the chain
    pub fn link(seq: u64, prev_hash: &str, record: &AuditRecord) -> Result<Self, AuditError> {
        let record = serde_json::to_value(record)?;
        let hash = link_hash(prev_hash, &record)?;
        Ok(Self {
            seq,
            prev_hash: prev_hash.to_string(),
            hash,
            record,
        })
    }

    /// Recompute this line's hash from its contents
    pub fn computed_hash(&self) -> Result<String, AuditError> {
        link_hash(&self.prev_hash, &self.record)
    }

    /// Decode the record
    pub fn decode(&self) -> Result<AuditRecord, serde_json::Error> {
        serde_json::from_value(self.record.clone())
    }
}

fn link_hash(prev_hash: &str, record: &serde_json::Value) -> Result<String, AuditError> {
    let canonical = serde_json::to_string(record)?;
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Parse one line of the trail
pub fn parse_line(text: &str, line: usize) -> Result<ChainedLine, AuditError> {
    serde_json::from_str(text).map_err(|e| AuditError::Corrupt {
        line,
        reason: e.to_string(),
    })
}

/// Summary of a verified trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Number of lines
    pub lines: u64,

    /// Number of intent records
    pub intents: usize,

    /// Number of outcome records
    pub outcomes: usize,

    /// Hash of the last line ([`GENESIS_HASH`] for an empty trail)
    pub last_hash: String,
}

/// Walk a trail and check every link
///
/// A missing file is an empty trail.
///
/// # Errors
///
/// - `AuditError::Corrupt` for a line that is not a chained record
/// - `AuditError::ChainBroken` for the first line whose sequence number,
///   `prev_hash` or `hash` does not match
pub fn verify_chain(path: impl AsRef<Path>) -> Result<ChainReport, AuditError> {
    let content = match std::fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    verify_lines(&content)
}

/// Check every link of a trail held in memory
pub fn verify_lines(content: &str) -> Result<ChainReport, AuditError> {
    let mut report = ChainReport {
        lines: 0,
        intents: 0,
        outcomes: 0,
        last_hash: GENESIS_HASH.to_string(),
    };

    for (index, text) in content.lines().enumerate() {
        let line_no = index + 1;
        if text.trim().is_empty() {
            return Err(AuditError::Corrupt {
                line: line_no,
                reason: "blank line".to_string(),
            });
        }

        let line = parse_line(text, line_no)?;
        if line.seq != report.lines {
            return Err(AuditError::ChainBroken {
                line: line_no,
                reason: format!("expected seq {}, found {}", report.lines, line.seq),
            });
        }
        if line.prev_hash != report.last_hash {
            return Err(AuditError::ChainBroken {
                line: line_no,
                reason: "prev_hash does not match previous line".to_string(),
            });
        }
        if line.computed_hash()? != line.hash {
            return Err(AuditError::ChainBroken {
                line: line_no,
                reason: "hash does not match record contents".to_string(),
            });
        }

        match line.decode() {
            Ok(AuditRecord::Intent(_)) => report.intents += 1,
            Ok(AuditRecord::Outcome(_)) => report.outcomes += 1,
            Err(e) => {
                return Err(AuditError::Corrupt {
                    line: line_no,
                    reason: e.to_string(),
                })
            }
        }

        report.lines += 1;
        report.last_hash = line.hash;
    }

    Ok(report)
}
