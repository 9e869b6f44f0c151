//! Warden CLI - Command-line interface for safety-gated ransomware remediation.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_cli::commands;
use warden_cli::{Cli, Command, Config, Formatter};
use warden_pipeline::Pipeline;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    // Command-line overrides
    if let Some(mode) = cli.mode {
        config.service.warden.pipeline.mode = mode.into();
    }
    if let Command::Batch(args) = &cli.command {
        if let Some(concurrency) = args.concurrency {
            config.service.warden.pipeline.concurrency = concurrency;
        }
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Serve(args) => {
            commands::execute_serve(args, config.service, &formatter).await?;
        }
        Command::VerifyAudit(args) => {
            commands::execute_verify_audit(args, config.service.warden.audit.path.clone(), &formatter)?;
        }
        Command::Assess(args) => {
            let pipeline = build_pipeline(&config)?;
            commands::execute_assess(args, &pipeline, &formatter).await?;
        }
        Command::Scan(args) => {
            let pipeline = build_pipeline(&config)?;
            commands::execute_scan(args, &pipeline, &formatter).await?;
        }
        Command::Batch(args) => {
            let pipeline = build_pipeline(&config)?;
            commands::execute_batch(args, &pipeline, &formatter).await?;
        }
    }

    Ok(())
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    Pipeline::from_config(&config.service.warden).context("assembling the remediation pipeline")
}
