//! `GET /progress/{session_id}`: server-sent progress stream
//!
//! Built on `async_stream::stream!` yielding `axum::response::sse::Event`s,
//! as a single poll loop with no pub/sub layer: one session's progress is
//! cheap to re-read every tick.

use std::str::FromStr;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use erawrapped_core::SessionId;
use futures_core::Stream;

use crate::error::ApiError;

use super::AppState;

pub async fn stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let session_id = SessionId::from_str(&session_id)
        .map_err(|_| ApiError::ValidationError("invalid session id".to_string()))?;

    if state.sessions.get_snapshot(session_id).await.is_none() {
        return Err(ApiError::NotFound("unknown session".to_string()));
    }

    let poll_interval = Duration::from_millis(state.server_config.progress_poll_interval_ms);
    let ceiling = Duration::from_secs(state.server_config.progress_stream_ceiling_secs);

    let event_stream = async_stream::stream! {
        let deadline = tokio::time::Instant::now() + ceiling;

        loop {
            if tokio::time::Instant::now() >= deadline {
                break;
            }

            let Some(session) = state.sessions.get_snapshot(session_id).await else {
                break;
            };

            let payload = serde_json::json!({
                "stage": session.progress.stage,
                "percent": session.progress.percent,
                "message": session.progress.message,
            });

            match serde_json::to_string(&payload) {
                Ok(json) => yield Ok(Event::default().data(json)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize progress snapshot");
                    break;
                }
            }

            if session.progress.stage.is_terminal() {
                break;
            }

            tokio::time::sleep(poll_interval).await;
        }
    };

    Ok(Sse::new(event_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
