//! Recommendation module - the model's proposed remediation

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Shape of a validated recommendation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadKind {
    /// Code taken from a single fenced block
    Code {
        /// Fence info string, lowercased (`sh`, `python`, ...), if any
        language: Option<String>,
    },

    /// Plain-text structured recommendation with no executable body
    Advice,
}

/// A remediation proposed by a recommendation source for one threat record
///
/// Immutable once created. Downstream stages only annotate it through
/// their own records (assessment, decision, execution result).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    threat_id: String,
    payload: String,
    kind: PayloadKind,
    model: String,
    created_at: u64,
}

impl Recommendation {
    /// Create a recommendation stamped with the current time
    pub fn new(
        threat_id: impl Into<String>,
        payload: impl Into<String>,
        kind: PayloadKind,
        model: impl Into<String>,
    ) -> Self {
        Self {
            threat_id: threat_id.into(),
            payload: payload.into(),
            kind,
            model: model.into(),
            created_at: crate::now_millis(),
        }
    }

    /// Identifier of the threat record this recommendation answers
    pub fn threat_id(&self) -> &str {
        &self.threat_id
    }

    /// Validated payload text (code body or advice paragraph)
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Payload shape
    pub fn kind(&self) -> &PayloadKind {
        &self.kind
    }

    /// Model identifier that produced the payload
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Creation time, milliseconds since the Unix epoch
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Fence language for code payloads
    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            PayloadKind::Code { language } => language.as_deref(),
            PayloadKind::Advice => None,
        }
    }

    /// SHA-256 hex digest of the payload, used to reference it from audit records
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_domain::{PayloadKind, Recommendation};
    ///
    /// let a = Recommendation::new("t1", "echo ok", PayloadKind::Advice, "m");
    /// let b = Recommendation::new("t2", "echo ok", PayloadKind::Advice, "other");
    /// assert_eq!(a.digest(), b.digest());
    /// assert_eq!(a.digest().len(), 64);
    /// ```
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.payload.as_bytes()))
    }
}
