//! Health check endpoints
//!
//! - /health: process is up
//! - /health/live: liveness probe
//! - /health/ready: readiness probe, 503 while the user store is unreachable

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DependencyStatus>,
}

/// Status of the backing store
#[derive(Serialize)]
pub struct DependencyStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn respond(status: &'static str, database: Option<DependencyStatus>) -> HealthResponse {
    HealthResponse {
        status,
        service: "mimic-sphere",
        version: env!("CARGO_PKG_VERSION"),
        database,
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(respond("healthy", None))
}

/// Readiness probe
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match db::health_check(state.db()).await {
        Ok(()) => Ok(Json(respond(
            "ready",
            Some(DependencyStatus {
                healthy: true,
                message: None,
            }),
        ))),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(respond(
                "not_ready",
                Some(DependencyStatus {
                    healthy: false,
                    message: Some(e.to_string()),
                }),
            )),
        )),
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(respond("alive", None))
}
