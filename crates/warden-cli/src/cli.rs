//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use warden_domain::RunMode;

/// Warden CLI - Safety-gated ransomware remediation.
#[derive(Debug, Parser)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.warden/config.toml)
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<String>,

    /// Run mode; overrides the configuration file
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (threat id and status only)
    Quiet,
}

/// Run mode options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    /// Execute confirmed recommendations
    Execute,
    /// Recommend and classify only; never execute
    Advise,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assess and remediate one threat
    Assess(AssessArgs),

    /// Assess a directory as one scan target
    Scan(ScanArgs),

    /// Run every threat listed in a CSV file
    Batch(BatchArgs),

    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Verify the audit trail's hash chain
    VerifyAudit(VerifyAuditArgs),
}

/// Arguments for the assess command.
#[derive(Debug, Parser)]
pub struct AssessArgs {
    /// Threat identifier
    pub threat_id: String,

    /// Path of the suspected artifact
    #[arg(short, long)]
    pub path: Option<String>,

    /// SHA-256 of the suspected artifact
    #[arg(long)]
    pub sha256: Option<String>,

    /// Free-form description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Confirm execution without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the scan command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Directory to scan
    pub dir: String,

    /// Maximum number of files listed
    #[arg(long, default_value_t = warden_pipeline::DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Confirm execution without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// CSV file with a header row and a threat_id column
    pub file: String,

    /// Confirm execution for every item; without it nothing executes
    #[arg(long)]
    pub confirm: bool,

    /// Items processed concurrently; overrides the configuration file
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Bind address; overrides the configuration file
    #[arg(long)]
    pub bind: Option<String>,

    /// Bind port; overrides the configuration file
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for the verify-audit command.
#[derive(Debug, Parser)]
pub struct VerifyAuditArgs {
    /// Audit trail to verify (default: the configured path)
    pub path: Option<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Execute => RunMode::Execute,
            ModeArg::Advise => RunMode::Advise,
        }
    }
}
