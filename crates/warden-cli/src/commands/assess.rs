//! Assess command implementation.

use super::run_single;
use crate::cli::AssessArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use warden_domain::ThreatRecord;
use warden_pipeline::Pipeline;

/// Execute the assess command.
pub async fn execute_assess(args: AssessArgs, pipeline: &Pipeline, formatter: &Formatter) -> Result<()> {
    let record = ThreatRecord::new(args.threat_id)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?
        .with_path(args.path)
        .with_fingerprint(args.sha256)
        .with_context(args.description);

    run_single(record, args.yes, pipeline, formatter).await
}
