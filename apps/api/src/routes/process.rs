//! `POST /process/{session_id}`: trigger the pipeline, fire-and-observe
//!
//! Acknowledges immediately; pipeline errors never surface here, they are
//! delivered through `/progress` and the `error` field of read endpoints.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use erawrapped_core::{run_pipeline, SessionId};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};

use super::AppState;

pub async fn trigger(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session_id = SessionId::from_str(&session_id)
        .map_err(|_| ApiError::ValidationError("invalid session id".to_string()))?;

    let already_running = state
        .sessions
        .with_session_mut(session_id, |session| {
            let was_running = session.running;
            session.running = true;
            was_running
        })
        .await
        .ok_or_else(|| ApiError::NotFound("unknown session".to_string()))?;

    if already_running {
        return Ok(Json(json!({ "status": "ok" })));
    }

    let sessions = state.sessions.clone();
    let llm_client = state.llm_client.clone();
    let segmenter_config = state.segmenter_config;

    tokio::spawn(async move {
        run_pipeline(&sessions, session_id, &segmenter_config, llm_client.as_ref()).await;
    });

    info!(%session_id, "pipeline triggered");

    Ok(Json(json!({ "status": "ok" })))
}
