//! Verify-audit command implementation.

use crate::cli::VerifyAuditArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::path::PathBuf;
use warden_audit::verify_chain;

/// Execute the verify-audit command.
///
/// `configured` is the trail named by the configuration file, used when
/// no path is given.
pub fn execute_verify_audit(
    args: VerifyAuditArgs,
    configured: PathBuf,
    formatter: &Formatter,
) -> Result<()> {
    let path = args.path.map(PathBuf::from).unwrap_or(configured);
    let report = verify_chain(&path)?;
    println!("{}", formatter.format_chain(&report)?);
    Ok(())
}
