//! Integration tests for the file-backed audit trail

use std::sync::Arc;
use warden_audit::{verify_chain, AuditConfig, AuditError, FileAuditLog};
use warden_domain::{
    AuditEntry, AuditLog, AuditRecord, ConfirmationDecision, ExecutionIntent, ItemStatus,
    PayloadKind, Recommendation, RiskAssessment, ThreatRecord,
};

fn open(dir: &tempfile::TempDir) -> (FileAuditLog, std::path::PathBuf) {
    let path = dir.path().join("audit.jsonl");
    let config = AuditConfig {
        path: path.clone(),
        sync: false,
    };
    (FileAuditLog::open(&config).unwrap(), path)
}

fn outcome(id: &str) -> AuditRecord {
    AuditRecord::Outcome(
        AuditEntry::new(ThreatRecord::new(id).unwrap(), ItemStatus::Executed)
            .with_note(format!("note for {}", id)),
    )
}

fn intent(id: &str) -> AuditRecord {
    let rec = Recommendation::new(id, "rm -f /tmp/x", PayloadKind::Advice, "mock");
    let decision = ConfirmationDecision {
        confirmed: true,
        required: true,
        source: None,
        actor: Some("tester".to_string()),
        decided_at: 1,
    };
    AuditRecord::Intent(ExecutionIntent::new(
        &rec,
        &RiskAssessment::from_triggers(vec![]),
        &decision,
    ))
}

#[tokio::test]
async fn test_concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let (log, path) = open(&dir);
    let log = Arc::new(log);

    let tasks = (0..50).map(|i| {
        let log = Arc::clone(&log);
        tokio::spawn(async move {
            let id = format!("t{}", i);
            log.append(intent(&id)).await.unwrap();
            log.append(outcome(&id)).await.unwrap();
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    let report = verify_chain(&path).unwrap();
    assert_eq!(report.lines, 100);
    assert_eq!(report.intents, 50);
    assert_eq!(report.outcomes, 50);
}

#[tokio::test]
async fn test_tampering_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let (log, path) = open(&dir);
    for id in ["a", "b", "c", "d"] {
        log.append(outcome(id)).await.unwrap();
    }
    drop(log);

    let content = std::fs::read_to_string(&path).unwrap();
    let tampered = content.replacen("note for c", "note for z", 1);
    std::fs::write(&path, tampered).unwrap();

    match verify_chain(&path) {
        Err(AuditError::ChainBroken { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected broken chain, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_trail_still_verifies_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let (log, path) = open(&dir);
    for id in ["a", "b", "c"] {
        log.append(outcome(id)).await.unwrap();
    }
    drop(log);

    // Dropping trailing lines leaves a valid (shorter) chain; the
    // resumed store continues from the new tail.
    let content = std::fs::read_to_string(&path).unwrap();
    let first_two: Vec<&str> = content.lines().take(2).collect();
    std::fs::write(&path, format!("{}\n", first_two.join("\n"))).unwrap();

    let (log, path) = open(&dir);
    log.append(outcome("d")).await.unwrap();

    let report = verify_chain(&path).unwrap();
    assert_eq!(report.lines, 3);
}

#[test]
fn test_missing_file_is_empty_trail() {
    let dir = tempfile::tempdir().unwrap();
    let report = verify_chain(dir.path().join("absent.jsonl")).unwrap();
    assert_eq!(report.lines, 0);
}
