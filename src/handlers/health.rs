// handlers/health.rs - GET /health handler

use axum::response::Json;
use serde_json::{json, Value};

/// Liveness check; never gated and never calls a collaborator.
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now(),
        }
    }))
}
