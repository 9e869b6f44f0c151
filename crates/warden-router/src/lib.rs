//! Warden Router
//!
//! REST transport for the remediation pipeline:
//!
//! - `POST /recommend`: one threat record, `{"threat": {...}, "confirm": true}`
//! - `POST /batch`: ordered threat records, `{"threats": [...], "confirm": true}`
//! - `GET /health`: model and run mode
//!
//! Only the JSON literal `true` confirms. A destructive recommendation
//! that was not confirmed answers `428 confirmation_required`.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::RouterConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use warden_pipeline::Pipeline;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Pipeline could not be assembled
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] warden_pipeline::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the Router HTTP server
///
/// Assembles the pipeline from configuration and serves until the
/// process is stopped.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    let pipeline = Pipeline::from_config(&config.warden)?;
    serve(config.bind_addr(), Arc::new(pipeline)).await
}

/// Serve an already assembled pipeline
pub async fn serve(bind_addr: String, pipeline: Arc<Pipeline>) -> Result<(), RouterError> {
    info!("Starting Warden Router");
    info!("Bind address: {}", bind_addr);
    info!("Model: {}", pipeline.model());
    info!("Mode: {:?}", pipeline.mode());
    info!("Confirmation policy: {}", pipeline.policy());

    let app = create_router(AppState { pipeline });

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Router listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
