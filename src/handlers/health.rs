//! Health check endpoint
//!
//! Reports process liveness and whether the daemon control API answers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Daemon status: "reachable" or "unreachable"
    pub daemon: &'static str,
}

/// Health check handler
///
/// Always returns 200 OK; daemon reachability is informational only.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let daemon = match state.client().version().await {
        Ok(_) => "reachable",
        Err(e) => {
            tracing::debug!(error = %e, "Daemon not reachable during health check");
            "unreachable"
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            daemon,
        }),
    )
}
