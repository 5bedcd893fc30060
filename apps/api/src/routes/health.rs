//! Liveness and readiness probes
//!
//! - `GET /health`: liveness route.
//! - `GET /health/ready`: checks the one external dependency this server
//!   has, the configured LLM endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::AppState;

pub async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.llm_client.health_check().await.unwrap_or(false);

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(serde_json::json!({ "status": if healthy { "ok" } else { "unavailable" } })))
}
