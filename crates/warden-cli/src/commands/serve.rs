//! Serve command implementation.

use crate::cli::ServeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use warden_router::config::RouterConfig;

/// Execute the serve command.
pub async fn execute_serve(args: ServeArgs, mut config: RouterConfig, formatter: &Formatter) -> Result<()> {
    if let Some(bind) = args.bind {
        if bind.trim().is_empty() {
            return Err(CliError::InvalidInput("bind address must not be empty".to_string()));
        }
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.bind_port = port;
    }

    eprintln!("{}", formatter.info(&format!("Serving on http://{}", config.bind_addr())));
    warden_router::start_server(config).await?;
    Ok(())
}
