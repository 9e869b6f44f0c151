//! Pipeline orchestrator
//!
//! Drives one threat record through source, classifier, gate, executor
//! and audit, in that order. Batch mode runs the same per-item logic over
//! a bounded number of concurrent items and reports in input order.

use crate::config::{PipelineSettings, WardenConfig};
use crate::{ConfigError, PipelineError, RecordError};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warden_audit::FileAuditLog;
use warden_domain::{
    now_millis, AuditEntry, AuditLog, AuditRecord, BatchReport, Confirmer, ExecutionIntent,
    Executor, ItemResult, ItemStatus, Recommendation, RecommendationSource, RunMode,
    SourceError, ThreatRecord,
};
use warden_executor::ProcessExecutor;
use warden_gatekeeper::{Classifier, ConfirmationGate, ConfirmationPolicy};
use warden_llm::OllamaSource;

/// The assembled remediation pipeline
///
/// Holds no per-run state: every run builds its own confirmation gate,
/// so one `Pipeline` can serve concurrent runs. The audit store is the
/// only shared resource and serializes its own appends.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use warden_audit::MemoryAuditLog;
/// use warden_domain::{ItemStatus, ThreatRecord};
/// use warden_executor::StubExecutor;
/// use warden_llm::MockSource;
/// use warden_pipeline::{Pipeline, PresetConfirmation};
///
/// let executor = StubExecutor::default();
/// let pipeline = Pipeline::new(
///     Arc::new(MockSource::new("kill -9 4242")),
///     Arc::new(executor.clone()),
///     Arc::new(MemoryAuditLog::new()),
/// );
///
/// let record = ThreatRecord::new("t1").unwrap();
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let result = rt
///     .block_on(pipeline.run_one(&record, &PresetConfirmation::absent()))
///     .unwrap();
/// assert_eq!(result.status, ItemStatus::SkippedNotConfirmed);
/// assert_eq!(executor.invocation_count(), 0);
/// ```
pub struct Pipeline {
    source: Arc<dyn RecommendationSource>,
    classifier: Classifier,
    policy: ConfirmationPolicy,
    executor: Arc<dyn Executor>,
    audit: Arc<dyn AuditLog>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Assemble a pipeline with the default rule table, the `always`
    /// confirmation policy and default settings
    pub fn new(
        source: Arc<dyn RecommendationSource>,
        executor: Arc<dyn Executor>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            source,
            classifier: Classifier::default(),
            policy: ConfirmationPolicy::default(),
            executor,
            audit,
            settings: PipelineSettings::default(),
        }
    }

    /// Build the production pipeline from configuration
    ///
    /// Uses the Ollama source, the process executor and the file audit
    /// trail.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails or a component cannot be
    /// initialized (HTTP client, audit file).
    pub fn from_config(config: &WardenConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let source = OllamaSource::new(config.llm.clone()).map_err(|e| ConfigError::Component {
            component: "recommendation source",
            message: e.to_string(),
        })?;
        let rules = config.gate.rule_set().map_err(|e| ConfigError::Component {
            component: "classifier",
            message: e.to_string(),
        })?;
        let executor =
            ProcessExecutor::new(config.executor.clone()).map_err(|e| ConfigError::Component {
                component: "executor",
                message: e.to_string(),
            })?;
        let audit = FileAuditLog::open(&config.audit).map_err(|e| ConfigError::Component {
            component: "audit trail",
            message: e.to_string(),
        })?;

        info!(
            model = %config.llm.model,
            rules = rules.len(),
            policy = %config.gate.policy,
            mode = ?config.pipeline.mode,
            audit = %config.audit.path.display(),
            "Pipeline assembled"
        );

        Ok(Self::new(Arc::new(source), Arc::new(executor), Arc::new(audit))
            .with_classifier(Classifier::new(rules))
            .with_policy(config.gate.policy)
            .with_settings(config.pipeline.clone()))
    }

    /// Replace the classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the confirmation policy
    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the orchestrator settings
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the run mode
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Model identifier of the recommendation source
    pub fn model(&self) -> &str {
        self.source.model()
    }

    /// Active run mode
    pub fn mode(&self) -> RunMode {
        self.settings.mode
    }

    /// Active confirmation policy
    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// Active settings
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one threat record through the pipeline
    ///
    /// The confirmer is asked exactly once, after classification. Every
    /// run that returns `Ok` has appended exactly one outcome record.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::PersistFailure` if an audit append fails.
    /// When the pre-execution intent cannot be persisted nothing is
    /// executed.
    pub async fn run_one(
        &self,
        record: &ThreatRecord,
        confirmer: &dyn Confirmer,
    ) -> Result<ItemResult, PipelineError> {
        let threat_id = record.id();
        debug!(threat_id, mode = ?self.settings.mode, "Requesting recommendation");

        let recommendation = match self.recommend(record).await {
            Ok(recommendation) => recommendation,
            Err(e) => return self.record_source_failure(record, e).await,
        };

        let assessment = self.classifier.classify(&recommendation);
        info!(
            threat_id,
            tier = %assessment.tier,
            triggers = assessment.triggers.len(),
            "Recommendation classified"
        );

        let signal = confirmer
            .confirm(record, &recommendation, &assessment)
            .await;
        let mut gate = ConfirmationGate::new(self.policy);
        let decision = gate.resolve(&assessment, signal)?;

        let (status, execution) = if self.settings.mode == RunMode::Advise {
            debug!(threat_id, "Advise mode, not executing");
            (ItemStatus::ClassificationOnly, None)
        } else if !decision.permits_execution() {
            warn!(threat_id, tier = %assessment.tier, "Skipping unconfirmed recommendation");
            (ItemStatus::SkippedNotConfirmed, None)
        } else {
            let intent = ExecutionIntent::new(&recommendation, &assessment, &decision);
            if let Err(e) = self.audit.append(AuditRecord::Intent(intent)).await {
                error!(threat_id, error = %e, "Execution intent not persisted, aborting before execution");
                return Err(e.into());
            }

            info!(threat_id, "Executing recommendation");
            let result = self.executor.execute(&recommendation).await;
            let status = ItemStatus::from_execution(&result);
            info!(
                threat_id,
                state = %result.state.as_str(),
                exit_code = ?result.exit_code,
                duration_ms = result.duration_ms,
                "Execution finished"
            );
            (status, Some(result))
        };

        let mut entry = AuditEntry::new(record.clone(), status)
            .with_recommendation(&recommendation)
            .with_assessment(&assessment)
            .with_decision(&decision);
        if let Some(result) = &execution {
            entry = entry.with_execution(result);
        }
        self.append_outcome(threat_id, entry).await?;

        Ok(ItemResult::assessed(
            &recommendation,
            &assessment,
            &decision,
            status,
            execution,
        ))
    }

    /// Run an ordered batch
    ///
    /// Up to `concurrency` items are in flight at once; the report lists
    /// items in input order. Invalid input elements become
    /// `invalid_record` items and are not audited, since no threat record
    /// exists for them. A failure of one item never stops the others,
    /// except an audit persist failure: items not yet started are then
    /// dropped and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first `PipelineError` in input order.
    pub async fn run_batch(
        &self,
        inputs: Vec<Result<ThreatRecord, RecordError>>,
        confirmer: &dyn Confirmer,
    ) -> Result<BatchReport, PipelineError> {
        let started_at = now_millis();
        let total = inputs.len();
        let concurrency = self.settings.concurrency.max(1);
        info!(items = total, concurrency, mode = ?self.settings.mode, "Batch started");

        let halted = AtomicBool::new(false);
        let halted = &halted;

        let outcomes: Vec<Option<Result<ItemResult, PipelineError>>> = stream::iter(inputs)
            .map(move |input| async move {
                if halted.load(Ordering::SeqCst) {
                    return None;
                }
                let outcome = match input {
                    Ok(record) => self.run_one(&record, confirmer).await,
                    Err(invalid) => {
                        warn!(item = %invalid.label, reason = %invalid.reason, "Invalid input record");
                        Ok(ItemResult::failed(
                            invalid.label,
                            ItemStatus::InvalidRecord,
                            invalid.reason,
                        ))
                    }
                };
                if outcome.is_err() {
                    halted.store(true, Ordering::SeqCst);
                }
                Some(outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut items = Vec::with_capacity(total);
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(item) => items.push(item),
                Err(e) => {
                    error!(completed = items.len(), items = total, error = %e, "Batch stopped");
                    return Err(e);
                }
            }
        }

        let report = BatchReport::new(items, started_at, now_millis());
        info!(summary = %report.summary(), "Batch finished");
        Ok(report)
    }

    async fn recommend(&self, record: &ThreatRecord) -> Result<Recommendation, SourceError> {
        let timeout = self.settings.source_timeout();
        match tokio::time::timeout(timeout, self.source.recommend(record, self.settings.mode)).await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::Unavailable(format!(
                "no recommendation within {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn record_source_failure(
        &self,
        record: &ThreatRecord,
        error: SourceError,
    ) -> Result<ItemResult, PipelineError> {
        let status = match error {
            SourceError::Unavailable(_) => ItemStatus::SourceUnavailable,
            SourceError::Malformed(_) => ItemStatus::MalformedRecommendation,
        };
        warn!(threat_id = record.id(), status = %status, error = %error, "No usable recommendation");

        let entry = AuditEntry::new(record.clone(), status).with_note(error.to_string());
        self.append_outcome(record.id(), entry).await?;
        Ok(ItemResult::failed(record.id(), status, error.to_string()))
    }

    async fn append_outcome(&self, threat_id: &str, entry: AuditEntry) -> Result<(), PipelineError> {
        let status = entry.status;
        self.audit
            .append(AuditRecord::Outcome(entry))
            .await
            .map_err(|e| {
                error!(threat_id, error = %e, "Outcome not persisted");
                PipelineError::from(e)
            })?;
        debug!(threat_id, status = %status, "Outcome recorded");
        Ok(())
    }
}
