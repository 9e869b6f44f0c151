//! End-to-end tests for the orchestrator with mock collaborators

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warden_audit::{verify_chain, AuditConfig, FailureMode, FileAuditLog, MemoryAuditLog};
use warden_domain::{
    AuditRecord, ConfirmationSignal, ConfirmationSource, Confirmer, ExecutionResult, Executor,
    ItemStatus, Recommendation, RiskAssessment, RiskTier, RunMode, SourceError, TerminalState,
    ThreatRecord,
};
use warden_executor::StubExecutor;
use warden_gatekeeper::ConfirmationPolicy;
use warden_llm::MockSource;
use warden_pipeline::{
    parse_threats_csv, scan_directory, Pipeline, PipelineError, PipelineSettings,
    PresetConfirmation, RecordError,
};

fn pipeline(source: MockSource, executor: &StubExecutor, audit: &MemoryAuditLog) -> Pipeline {
    Pipeline::new(
        Arc::new(source),
        Arc::new(executor.clone()),
        Arc::new(audit.clone()),
    )
}

fn t1() -> ThreatRecord {
    ThreatRecord::new("t1")
        .unwrap()
        .with_path(Some("/tmp/x".to_string()))
        .with_fingerprint(Some("aaaa".to_string()))
}

fn confirm(answer: Option<bool>) -> PresetConfirmation {
    PresetConfirmation::new(answer, ConfirmationSource::RequestFlag, "tester")
}

/// Confirmer that counts how often it is asked
#[derive(Default, Clone)]
struct CountingConfirmer {
    asked: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Confirmer for CountingConfirmer {
    async fn confirm(
        &self,
        record: &ThreatRecord,
        _recommendation: &Recommendation,
        _assessment: &RiskAssessment,
    ) -> Option<ConfirmationSignal> {
        self.asked.lock().unwrap().push(record.id().to_string());
        Some(ConfirmationSignal::new(
            true,
            ConfirmationSource::Interactive,
            "analyst",
        ))
    }
}

/// Executor whose run time depends on the threat id
#[derive(Default, Clone)]
struct DelayedExecutor {
    delays: HashMap<String, Duration>,
    finished: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Executor for DelayedExecutor {
    async fn execute(&self, recommendation: &Recommendation) -> ExecutionResult {
        if let Some(delay) = self.delays.get(recommendation.threat_id()) {
            tokio::time::sleep(*delay).await;
        }
        self.finished
            .lock()
            .unwrap()
            .push(recommendation.threat_id().to_string());
        ExecutionResult {
            state: TerminalState::Completed,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 0,
            detail: None,
        }
    }
}

#[tokio::test]
async fn test_destructive_unconfirmed_is_skipped_and_audited() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("terminate_process(4242)"), &executor, &audit);

    let result = p.run_one(&t1(), &confirm(Some(false))).await.unwrap();

    assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
    assert_eq!(result.tier, Some(RiskTier::Destructive));
    assert!(result.requires_confirmation());
    assert_eq!(executor.invocation_count(), 0);

    let outcomes = audit.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].confirmed());
    assert_eq!(outcomes[0].threat.fingerprint(), Some("aaaa"));
    assert_eq!(audit.intent_count(), 0);
}

#[tokio::test]
async fn test_confirmed_run_executes_after_intent() {
    let executor = StubExecutor::completed(0, "process 4242 terminated");
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("terminate_process(4242)"), &executor, &audit);

    let result = p.run_one(&t1(), &confirm(Some(true))).await.unwrap();

    assert_eq!(result.status, ItemStatus::Executed);
    assert_eq!(executor.invoked_threats(), vec!["t1"]);
    let execution = result.execution.unwrap();
    assert_eq!(execution.state, TerminalState::Completed);
    assert_eq!(execution.exit_code, Some(0));

    let records = audit.records();
    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], AuditRecord::Intent(_)));
    let outcome = records[1].as_outcome().unwrap();
    assert!(outcome.confirmed());
    assert_eq!(
        outcome.execution.as_ref().unwrap().stdout,
        "process 4242 terminated"
    );
}

#[tokio::test]
async fn test_absent_or_malformed_confirmation_never_executes() {
    for answer in [None, Some(false)] {
        let executor = StubExecutor::default();
        let audit = MemoryAuditLog::new();
        let p = pipeline(MockSource::new("ls /tmp"), &executor, &audit);

        let result = p.run_one(&t1(), &confirm(answer)).await.unwrap();
        assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
        assert_eq!(executor.invocation_count(), 0);
        assert_eq!(audit.outcome_count(), 1);
    }

    for raw in [serde_json::json!("true"), serde_json::json!(1), serde_json::json!({})] {
        let executor = StubExecutor::default();
        let audit = MemoryAuditLog::new();
        let p = pipeline(MockSource::new("ls /tmp"), &executor, &audit);

        let confirmer =
            PresetConfirmation::from_flag(Some(&raw), ConfirmationSource::RequestFlag, "api");
        let result = p.run_one(&t1(), &confirmer).await.unwrap();
        assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
        assert_eq!(executor.invocation_count(), 0);
    }
}

#[tokio::test]
async fn test_benign_requires_confirmation_by_default() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("ls -la /tmp"), &executor, &audit);

    let result = p.run_one(&t1(), &PresetConfirmation::absent()).await.unwrap();
    assert_eq!(result.tier, Some(RiskTier::Benign));
    assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
    assert!(!result.requires_confirmation());
    assert_eq!(executor.invocation_count(), 0);
}

#[tokio::test]
async fn test_destructive_only_policy_runs_benign_without_confirmation() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("ls -la /tmp"), &executor, &audit)
        .with_policy(ConfirmationPolicy::DestructiveOnly);

    let result = p.run_one(&t1(), &PresetConfirmation::absent()).await.unwrap();
    assert_eq!(result.status, ItemStatus::Executed);
    assert_eq!(executor.invocation_count(), 1);
    let decision = result.decision.unwrap();
    assert!(!decision.confirmed);
    assert!(!decision.required);

    // Destructive still needs the signal
    let executor = StubExecutor::default();
    let p = pipeline(MockSource::new("rm -f /tmp/x"), &executor, &audit)
        .with_policy(ConfirmationPolicy::DestructiveOnly);
    let result = p.run_one(&t1(), &PresetConfirmation::absent()).await.unwrap();
    assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
    assert_eq!(executor.invocation_count(), 0);
}

#[tokio::test]
async fn test_confirmer_asked_once_per_run() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("kill 1"), &executor, &audit);
    let confirmer = CountingConfirmer::default();

    let inputs = vec![
        Ok(ThreatRecord::new("a").unwrap()),
        Ok(ThreatRecord::new("b").unwrap()),
    ];
    p.run_batch(inputs, &confirmer).await.unwrap();

    let mut asked = confirmer.asked.lock().unwrap().clone();
    asked.sort();
    assert_eq!(asked, vec!["a", "b"]);
}

#[tokio::test]
async fn test_advise_mode_never_executes() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("kill -9 4242"), &executor, &audit).with_mode(RunMode::Advise);

    let result = p.run_one(&t1(), &confirm(Some(true))).await.unwrap();
    assert_eq!(result.status, ItemStatus::ClassificationOnly);
    assert_eq!(result.tier, Some(RiskTier::Destructive));
    assert_eq!(executor.invocation_count(), 0);
    assert_eq!(audit.outcome_count(), 1);
    assert_eq!(audit.intent_count(), 0);
}

#[tokio::test]
async fn test_empty_recommendation_is_malformed() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new(""), &executor, &audit);

    let result = p.run_one(&t1(), &confirm(Some(true))).await.unwrap();
    assert_eq!(result.status, ItemStatus::MalformedRecommendation);
    assert!(result.error.is_some());
    assert_eq!(executor.invocation_count(), 0);

    let outcomes = audit.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ItemStatus::MalformedRecommendation);
    assert!(outcomes[0].note.as_deref().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_source_unavailable_is_audited() {
    let mut source = MockSource::default();
    source.add_error("t1", SourceError::Unavailable("connection refused".into()));
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(source, &executor, &audit);

    let result = p.run_one(&t1(), &confirm(Some(true))).await.unwrap();
    assert_eq!(result.status, ItemStatus::SourceUnavailable);
    assert_eq!(audit.outcomes()[0].status, ItemStatus::SourceUnavailable);
}

#[tokio::test]
async fn test_source_timeout_is_unavailable() {
    let source = MockSource::new("ls").with_latency(Duration::from_secs(5));
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(source, &executor, &audit).with_settings(PipelineSettings {
        source_timeout_secs: 1,
        ..PipelineSettings::default()
    });

    let started = std::time::Instant::now();
    let result = p.run_one(&t1(), &confirm(Some(true))).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(result.status, ItemStatus::SourceUnavailable);
    assert_eq!(executor.invocation_count(), 0);
}

#[tokio::test]
async fn test_intent_persist_failure_aborts_before_execution() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new().with_failure(FailureMode::Intents);
    let p = pipeline(MockSource::new("rm -f /tmp/x"), &executor, &audit);

    let result = p.run_one(&t1(), &confirm(Some(true))).await;
    assert!(matches!(result, Err(PipelineError::PersistFailure(_))));
    assert_eq!(executor.invocation_count(), 0);
    assert_eq!(audit.records().len(), 0);
}

#[tokio::test]
async fn test_outcome_persist_failure_stops_batch() {
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new().with_failure(FailureMode::Outcomes);
    let p = pipeline(MockSource::new("ls"), &executor, &audit).with_settings(PipelineSettings {
        concurrency: 1,
        ..PipelineSettings::default()
    });

    let inputs = vec![
        Ok(ThreatRecord::new("a").unwrap()),
        Ok(ThreatRecord::new("b").unwrap()),
        Ok(ThreatRecord::new("c").unwrap()),
    ];
    let result = p.run_batch(inputs, &PresetConfirmation::absent()).await;
    assert!(matches!(result, Err(PipelineError::PersistFailure(_))));
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let executor = DelayedExecutor {
        delays: HashMap::from([("B".to_string(), Duration::from_millis(300))]),
        ..DelayedExecutor::default()
    };
    let audit = MemoryAuditLog::new();
    let p = Pipeline::new(
        Arc::new(MockSource::new("echo ok")),
        Arc::new(executor.clone()),
        Arc::new(audit.clone()),
    )
    .with_settings(PipelineSettings {
        concurrency: 3,
        ..PipelineSettings::default()
    });

    let inputs = ["A", "B", "C"]
        .iter()
        .map(|id| Ok(ThreatRecord::new(*id).unwrap()))
        .collect();
    let confirmer = PresetConfirmation::new(Some(true), ConfirmationSource::BatchFlag, "ops");
    let report = p.run_batch(inputs, &confirmer).await.unwrap();

    let order: Vec<&str> = report.items.iter().map(|i| i.threat_id.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(*executor.finished.lock().unwrap(), vec!["A", "C", "B"]);
    assert_eq!(report.counts.executed, 3);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let mut source = MockSource::new("echo ok");
    source.add_response("bad", "");
    source.add_error("down", SourceError::Unavailable("timeout".into()));
    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(source, &executor, &audit);

    let inputs = vec![
        Ok(ThreatRecord::new("ok1").unwrap()),
        Ok(ThreatRecord::new("bad").unwrap()),
        Err(RecordError::row(4, "threat_id must not be empty")),
        Ok(ThreatRecord::new("down").unwrap()),
        Ok(ThreatRecord::new("ok2").unwrap()),
    ];
    let confirmer = PresetConfirmation::new(Some(true), ConfirmationSource::BatchFlag, "ops");
    let report = p.run_batch(inputs, &confirmer).await.unwrap();

    let statuses: Vec<ItemStatus> = report.items.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![
            ItemStatus::Executed,
            ItemStatus::MalformedRecommendation,
            ItemStatus::InvalidRecord,
            ItemStatus::SourceUnavailable,
            ItemStatus::Executed,
        ]
    );
    assert_eq!(report.items[2].threat_id, "row-4");
    assert_eq!(report.counts.total, 5);
    assert_eq!(report.counts.executed, 2);
    assert_eq!(report.counts.failed, 3);

    // Invalid rows have no threat record and are not audited
    assert_eq!(audit.outcome_count(), 4);
    assert_eq!(executor.invocation_count(), 2);
}

#[tokio::test]
async fn test_audit_completeness_over_n_runs() {
    let mut source = MockSource::new("kill -9 1");
    source.add_response("t3", "");
    source.add_error("t4", SourceError::Unavailable("down".into()));
    let executor = StubExecutor::timed_out();
    let audit = MemoryAuditLog::new();
    let p = pipeline(source, &executor, &audit);

    let n = 6;
    for i in 0..n {
        let record = ThreatRecord::new(format!("t{}", i)).unwrap();
        let answer = Some(i % 2 == 0);
        p.run_one(&record, &confirm(answer)).await.unwrap();
    }

    assert_eq!(audit.outcome_count(), n);
}

#[tokio::test]
async fn test_csv_batch_against_file_trail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let audit = FileAuditLog::open(&AuditConfig {
        path: path.clone(),
        sync: false,
    })
    .unwrap();

    let executor = StubExecutor::default();
    let p = Pipeline::new(
        Arc::new(MockSource::new("Quarantine the file.")),
        Arc::new(executor.clone()),
        Arc::new(audit),
    );

    let csv = "threat_id,file_path,sha256\nt1,/tmp/x,aaaa\n,/tmp/y,bbbb\nt3,/tmp/z,cccc\n";
    let rows = parse_threats_csv(csv.as_bytes()).unwrap();
    let confirmer = PresetConfirmation::new(Some(true), ConfirmationSource::BatchFlag, "ops");
    let report = p.run_batch(rows, &confirmer).await.unwrap();

    assert_eq!(report.counts.total, 3);
    assert_eq!(report.items[1].status, ItemStatus::InvalidRecord);
    assert_eq!(report.items[1].threat_id, "row-3");

    let chain = verify_chain(&path).unwrap();
    assert_eq!(chain.outcomes, 2);
    assert_eq!(chain.intents, 2);
}

#[tokio::test]
async fn test_scan_target_runs_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt.locked"), "encrypted").unwrap();
    let record = scan_directory(dir.path(), 10).unwrap();

    let executor = StubExecutor::default();
    let audit = MemoryAuditLog::new();
    let p = pipeline(MockSource::new("Isolate the host."), &executor, &audit)
        .with_mode(RunMode::Advise);

    let result = p.run_one(&record, &PresetConfirmation::absent()).await.unwrap();
    assert_eq!(result.status, ItemStatus::ClassificationOnly);
    assert_eq!(audit.outcomes()[0].threat.id(), record.id());
}

#[cfg(unix)]
#[tokio::test]
async fn test_runaway_payload_times_out_without_blocking_batch() {
    use warden_executor::{ExecutorConfig, ProcessExecutor};

    let mut source = MockSource::new("```sh\necho ok\n```");
    source.add_response("slow", "```sh\nsleep 30\n```");
    let executor = ProcessExecutor::new(ExecutorConfig::default())
        .unwrap()
        .with_timeout(Duration::from_millis(300));
    let audit = MemoryAuditLog::new();
    let p = Pipeline::new(Arc::new(source), Arc::new(executor), Arc::new(audit.clone()));

    let inputs = vec![
        Ok(ThreatRecord::new("slow").unwrap()),
        Ok(ThreatRecord::new("fast").unwrap()),
    ];
    let confirmer = PresetConfirmation::new(Some(true), ConfirmationSource::BatchFlag, "ops");

    let started = std::time::Instant::now();
    let report = p.run_batch(inputs, &confirmer).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));

    assert_eq!(report.items[0].status, ItemStatus::TimedOut);
    assert_eq!(report.items[1].status, ItemStatus::Executed);
    assert_eq!(report.items[1].execution.as_ref().unwrap().stdout.trim(), "ok");
    assert_eq!(report.counts.timed_out, 1);
    assert_eq!(audit.outcome_count(), 2);
}
