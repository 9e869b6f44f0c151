//! Scan command implementation.

use super::run_single;
use crate::cli::ScanArgs;
use crate::error::Result;
use crate::output::Formatter;
use warden_pipeline::{scan_directory, Pipeline};

/// Execute the scan command.
pub async fn execute_scan(args: ScanArgs, pipeline: &Pipeline, formatter: &Formatter) -> Result<()> {
    let dir = args.dir.clone();
    let max_files = args.max_files;
    let record = tokio::task::spawn_blocking(move || scan_directory(dir, max_files))
        .await
        .map_err(std::io::Error::other)??;
    run_single(record, args.yes, pipeline, formatter).await
}
