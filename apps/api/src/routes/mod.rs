//! HTTP route handlers for the erawrapped API
//!
//! - `health`: liveness and readiness probes
//! - `upload`: multipart upload, parse into a new session
//! - `process`: trigger the pipeline for a parsed session
//! - `progress`: SSE progress stream
//! - `session`: read endpoints (summary, era list, era detail)

pub mod health;
pub mod process;
pub mod progress;
pub mod session;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use erawrapped_core::SessionStore;
use erawrapped_llm_client::LlmClient;
use erawrapped_shared_config::{SegmenterConfig, ServerConfig};

/// Shared application state, composed once in `main` and cloned cheaply per request
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub llm_client: Arc<dyn LlmClient>,
    pub segmenter_config: SegmenterConfig,
    pub server_config: ServerConfig,
}

pub fn build_router(state: AppState) -> Router {
    // axum's default body limit is 2 MiB, far below the 500 MiB upload cap,
    // so /upload needs its own limit raised to match `max_upload_bytes`.
    let upload_router = Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(state.server_config.max_upload_bytes as usize));

    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/process/:session_id", post(process::trigger))
        .route("/progress/:session_id", get(progress::stream))
        .route("/session/:session_id/summary", get(session::summary))
        .route("/session/:session_id/eras", get(session::eras))
        .route("/session/:session_id/eras/:era_id", get(session::era_detail))
        .merge(upload_router)
        .with_state(state)
}
