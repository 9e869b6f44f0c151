//! Warden Router binary
//!
//! Starts the HTTP server for single-item and batch remediation requests.

use std::env;
use std::process;
use tracing_subscriber::EnvFilter;
use warden_router::{config::RouterConfig, start_server, RouterError};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        RouterConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using defaults");
        eprintln!("Usage: warden-router --config <path-to-config.toml>");
        eprintln!();
        RouterConfig::default()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Warden Router - Safety-gated remediation over HTTP");
    println!();
    println!("USAGE:");
    println!("    warden-router --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /recommend    {{\"threat\": {{...}}, \"confirm\": true}}");
    println!("    POST /batch        {{\"threats\": [...], \"confirm\": true}}");
    println!("    GET  /health");
    println!();
    println!("CONFIGURATION:");
    println!("    [server]    bind_address, bind_port");
    println!("    [llm]       endpoint, model, timeout_secs, max_retries");
    println!("    [gate]      policy, rules");
    println!("    [executor]  timeout_secs, max_output_bytes, working_dir");
    println!("    [audit]     path, sync");
    println!("    [pipeline]  mode, source_timeout_secs, concurrency");
    println!();
}
