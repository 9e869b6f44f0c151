//! HTTP request handlers for the Router service.
//!
//! Implements the single-item, batch and health endpoints using axum.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use warden_domain::{BatchReport, ConfirmationSource, ItemResult, ItemStatus, RunMode, ThreatRecord};
use warden_pipeline::{Pipeline, PipelineError, PresetConfirmation, RecordError};

/// Header naming who supplied the confirmation; recorded in the audit trail
pub const ACTOR_HEADER: &str = "x-warden-actor";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The assembled pipeline
    pub pipeline: Arc<Pipeline>,
}

/// Single-item request
///
/// `confirm` is deliberately untyped: only the JSON literal `true`
/// confirms, and any other value (or none) takes the not-confirmed path
/// instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// The threat record
    pub threat: ThreatRecord,

    /// Confirmation flag
    #[serde(default)]
    pub confirm: Option<serde_json::Value>,
}

/// Batch request
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Threat records; each element is validated on its own
    pub threats: Vec<serde_json::Value>,

    /// Confirmation flag, applied to every item
    #[serde(default)]
    pub confirm: Option<serde_json::Value>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Model behind the recommendation source
    pub model: String,
    /// Active run mode
    pub mode: RunMode,
}

/// Body for a single-item run that did not produce an action
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// The full item result
    pub result: ItemResult,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The audit trail could not be written
    PersistFailure(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::PersistFailure(msg) => msg,
            AppError::InternalError(msg) => msg,
        };

        let body = Json(ErrorResponse { error: message });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::PersistFailure(e) => AppError::PersistFailure(e.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

fn actor(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// POST /recommend - Run one threat record
///
/// 200 with the item result; 428 when a destructive recommendation was
/// not confirmed; 502 when the recommendation source failed; 500 when
/// the audit trail could not be written.
async fn recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RecommendRequest>,
) -> Result<Response, AppError> {
    let confirmer = PresetConfirmation::from_flag(
        request.confirm.as_ref(),
        ConfirmationSource::RequestFlag,
        actor(&headers, "api"),
    );

    let result = state.pipeline.run_one(&request.threat, &confirmer).await?;
    info!(threat_id = %result.threat_id, status = %result.status, "Request handled");

    let response = if result.requires_confirmation() {
        item_error(StatusCode::PRECONDITION_REQUIRED, "confirmation_required", result)
    } else {
        match result.status {
            ItemStatus::SourceUnavailable | ItemStatus::MalformedRecommendation => {
                let code = result.status.as_str();
                item_error(StatusCode::BAD_GATEWAY, code, result)
            }
            _ => (StatusCode::OK, Json(result)).into_response(),
        }
    };
    Ok(response)
}

fn item_error(status: StatusCode, code: &str, result: ItemResult) -> Response {
    let body = ItemErrorResponse {
        error: code.to_string(),
        result,
    };
    (status, Json(body)).into_response()
}

/// POST /batch - Run an ordered list of threat records
async fn batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchReport>, AppError> {
    let confirmer = PresetConfirmation::from_flag(
        request.confirm.as_ref(),
        ConfirmationSource::BatchFlag,
        actor(&headers, "api"),
    );

    let inputs: Vec<Result<ThreatRecord, RecordError>> = request
        .threats
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).map_err(|e| RecordError::item(i + 1, e.to_string()))
        })
        .collect();

    let report = state.pipeline.run_batch(inputs, &confirmer).await.map_err(|e| {
        warn!(error = %e, "Batch aborted");
        AppError::from(e)
    })?;
    Ok(Json(report))
}

/// GET /health - Service status
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model: state.pipeline.model().to_string(),
        mode: state.pipeline.mode(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/recommend", post(recommend))
        .route("/batch", post(batch))
        .route("/health", get(health_check))
        .with_state(state)
}
