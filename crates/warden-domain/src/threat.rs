//! Threat records - the unit of work entering the pipeline

use crate::DomainError;
use serde::{Deserialize, Serialize};

/// One suspected ransomware artifact or scan target
///
/// Created by the caller (CLI argument, CSV row, request body or directory
/// scan) and never modified afterwards. The identifier is opaque but must
/// be non-empty.
///
/// On the wire the fields use the names of the REST API (`threat_id`,
/// `file_path`, `sha256`, `description`); the shorter names `id`, `path`,
/// `hash` and `context` are accepted as aliases. An `additional_info`
/// object is folded into the context as `key=value` pairs, the same way
/// extra CSV columns are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThreatRecord")]
pub struct ThreatRecord {
    #[serde(rename = "threat_id")]
    id: String,

    #[serde(rename = "file_path", skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    #[serde(rename = "sha256", skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,

    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

/// Unvalidated wire shape
#[derive(Deserialize)]
struct RawThreatRecord {
    #[serde(alias = "id")]
    threat_id: String,
    #[serde(default, alias = "path")]
    file_path: Option<String>,
    #[serde(default, alias = "hash")]
    sha256: Option<String>,
    #[serde(default, alias = "context")]
    description: Option<String>,
    #[serde(default)]
    additional_info: Option<serde_json::Map<String, serde_json::Value>>,
}

impl RawThreatRecord {
    /// Description followed by `key=value` for every non-null extra field
    fn context(&self) -> Option<String> {
        let mut parts: Vec<String> = self.description.iter().cloned().collect();
        if let Some(info) = &self.additional_info {
            parts.extend(info.iter().filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.trim().is_empty() => None,
                serde_json::Value::String(s) => Some(format!("{}={}", key, s)),
                other => Some(format!("{}={}", key, other)),
            }));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

impl TryFrom<RawThreatRecord> for ThreatRecord {
    type Error = DomainError;

    fn try_from(raw: RawThreatRecord) -> Result<Self, Self::Error> {
        let context = raw.context();
        Ok(ThreatRecord::new(raw.threat_id)?
            .with_path(raw.file_path)
            .with_fingerprint(raw.sha256)
            .with_context(context))
    }
}

impl ThreatRecord {
    /// Create a record with the given identifier
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` if the identifier is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_domain::ThreatRecord;
    ///
    /// let record = ThreatRecord::new("t1").unwrap().with_path(Some("/tmp/x".into()));
    /// assert_eq!(record.id(), "t1");
    /// assert!(ThreatRecord::new("  ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(DomainError::InvalidRecord(
                "threat_id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            path: None,
            fingerprint: None,
            context: None,
        })
    }

    /// Attach a file or directory reference
    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = non_blank(path);
        self
    }

    /// Attach a content fingerprint (e.g. a SHA-256 hex digest)
    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.fingerprint = non_blank(fingerprint);
        self
    }

    /// Attach free-text context
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = non_blank(context);
        self
    }

    /// Opaque identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// File or directory reference
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Free-text context
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_rejects_blank() {
        assert_eq!(ThreatRecord::new(" t1 ").unwrap().id(), "t1");
        assert!(matches!(
            ThreatRecord::new(""),
            Err(DomainError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_blank_optionals_are_dropped() {
        let record = ThreatRecord::new("t1")
            .unwrap()
            .with_path(Some("".into()))
            .with_fingerprint(Some("aaaa".into()));
        assert_eq!(record.path(), None);
        assert_eq!(record.fingerprint(), Some("aaaa"));
    }

    #[test]
    fn test_deserialize_api_names() {
        let json = r#"{"threat_id": "malware-001", "file_path": "/tmp/x", "sha256": "aaaa"}"#;
        let record: ThreatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), "malware-001");
        assert_eq!(record.path(), Some("/tmp/x"));
        assert_eq!(record.fingerprint(), Some("aaaa"));
        assert_eq!(record.context(), None);
    }

    #[test]
    fn test_deserialize_short_aliases() {
        let json = r#"{"id": "t1", "path": "/tmp/x", "hash": "aaaa", "context": "seen in /tmp"}"#;
        let record: ThreatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), "t1");
        assert_eq!(record.context(), Some("seen in /tmp"));
    }

    #[test]
    fn test_additional_info_folded_into_context() {
        let json = r#"{
            "threat_id": "t1",
            "description": "dropped by macro",
            "additional_info": {"detection": "Ransom.Lockbit", "pid": 4242, "parent": null}
        }"#;
        let record: ThreatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.context(),
            Some("dropped by macro; detection=Ransom.Lockbit; pid=4242")
        );

        let json = r#"{"threat_id": "t2", "additional_info": {"engine": "edr"}}"#;
        let record: ThreatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.context(), Some("engine=edr"));
    }

    #[test]
    fn test_deserialize_rejects_blank_id() {
        let json = r#"{"threat_id": "   "}"#;
        assert!(serde_json::from_str::<ThreatRecord>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_api_names() {
        let record = ThreatRecord::new("t1").unwrap().with_path(Some("/tmp/x".into()));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["threat_id"], "t1");
        assert_eq!(value["file_path"], "/tmp/x");
        assert!(value.get("sha256").is_none());
    }
}
