//! Liveness endpoints

use axum::{response::IntoResponse, Json};
use serde_json::json;
use tracing::debug;

/// Root probe. Clients look for this exact status text.
pub async fn root_status() -> impl IntoResponse {
    Json(json!({ "status": "API is running" }))
}

/// Health check handler
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check requested");
    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
