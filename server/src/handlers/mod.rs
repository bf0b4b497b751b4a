//! HTTP request handlers for the Orion server.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

pub mod cv;
pub mod habitica;
pub mod journal;
pub mod memory;
pub mod narrative;
pub mod opportunity;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String
}

/// Health check endpoint. Does not touch any upstream service.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string()
    })
}

/// Prometheus-format metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::OK,
            "# HELP orion_up Whether the server is up\n# TYPE orion_up gauge\norion_up 1\n"
                .to_string()
        )
    }
}
