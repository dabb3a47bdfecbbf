// handlers/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::server::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Bento Profile API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "profile": "GET /profile/:username (public), PUT /profile/:username (owner)",
                "block": "POST|PUT /profile/:username/block, DELETE /profile/:username/block/:objectId (owner)",
                "details": "PATCH /profile/:username/displayname, PATCH /profile/:username/bio (owner)",
                "avatar": "POST /profile/:username/avatar (owner)",
                "health": "GET /health (public)"
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.profiles.store().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
