//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::prompt::current_user;
use warden_domain::ConfirmationSource;
use warden_pipeline::{read_threats_csv, Pipeline, PresetConfirmation};

/// Execute the batch command.
///
/// Items are never prompted for. Without `--confirm` no item receives a
/// confirmation signal.
pub async fn execute_batch(args: BatchArgs, pipeline: &Pipeline, formatter: &Formatter) -> Result<()> {
    let rows = read_threats_csv(&args.file)?;
    if rows.is_empty() {
        println!("{}", formatter.warning("No threats in input file"));
        return Ok(());
    }

    let confirm = PresetConfirmation::new(
        args.confirm.then_some(true),
        ConfirmationSource::BatchFlag,
        current_user(),
    );

    let report = pipeline.run_batch(rows, &confirm).await?;
    println!("{}", formatter.format_report(&report)?);
    Ok(())
}
