use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::dto::HealthResponse;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        service: "moodmirror".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
        openai_configured: state.analyzer.is_some(),
    })
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.journal.ping().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "journal": "ok" },
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "checks": { "journal": "failed" },
            })),
        )
    }
}
