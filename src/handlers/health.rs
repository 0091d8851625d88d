// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness probe. Does not touch the store.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
