//! Command implementations.

pub mod assess;
pub mod batch;
pub mod scan;
pub mod serve;
pub mod verify;

pub use self::assess::execute_assess;
pub use self::batch::execute_batch;
pub use self::scan::execute_scan;
pub use self::serve::execute_serve;
pub use self::verify::execute_verify_audit;

use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::prompt::InteractiveConfirmer;
use warden_domain::{ConfirmationSource, RunMode, ThreatRecord};
use warden_pipeline::{Pipeline, PresetConfirmation};

/// Run one record, print its result, and fail if a destructive
/// recommendation went unconfirmed.
async fn run_single(
    record: ThreatRecord,
    yes: bool,
    pipeline: &Pipeline,
    formatter: &Formatter,
) -> Result<()> {
    let prompt = InteractiveConfirmer::new();
    let result = if yes {
        let confirm = PresetConfirmation::new(Some(true), ConfirmationSource::CliFlag, prompt.actor());
        pipeline.run_one(&record, &confirm).await?
    } else if pipeline.mode() == RunMode::Advise {
        // Nothing executes in advise mode; don't prompt for it.
        pipeline.run_one(&record, &PresetConfirmation::absent()).await?
    } else {
        pipeline.run_one(&record, &prompt).await?
    };

    println!("{}", formatter.format_item(&result)?);

    if result.requires_confirmation() {
        return Err(CliError::ConfirmationRequired(result.threat_id));
    }
    Ok(())
}
