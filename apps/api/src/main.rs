use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use erawrapped_core::SessionStore;
use erawrapped_llm_client::{LlmClient, OllamaLlmClient};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod routes;

pub use error::{ApiError, ApiResult, ErrorResponse};

use routes::{build_router, AppState};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ALLOWED_ORIGINS` is set, only those origins are allowed
/// - If not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ALLOWED_ORIGINS` is set, those origins are used
/// - If not set, permissive CORS is used for convenience
fn build_cors_layer(config: &config::Config) -> CorsLayer {
    let is_production = config.is_production();

    match config.cors_allowed_origins() {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if is_production => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ALLOWED_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ALLOWED_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

/// Periodically reclaim sessions that have been idle past their TTL.
fn spawn_session_sweeper(sessions: SessionStore, ttl_secs: i64, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let removed = sessions.sweep_expired(ttl_secs, chrono::Utc::now()).await;
            if removed > 0 {
                tracing::debug!(removed, "swept expired sessions");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erawrapped_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;

    tracing::info!(
        port = config.server().port,
        environment = %config.environment(),
        "Starting erawrapped API server"
    );

    let llm_client: Arc<dyn LlmClient> = Arc::new(OllamaLlmClient::new(config.ollama())?);
    tracing::info!(url = %config.ollama().url, model = %config.ollama().model, "LLM client configured");

    let sessions = SessionStore::new();
    spawn_session_sweeper(
        sessions.clone(),
        config.server().session_ttl_secs as i64,
        config.server().sweep_interval_secs,
    );

    let state = AppState {
        sessions,
        llm_client,
        segmenter_config: config.common.segmenter,
        server_config: config.server().clone(),
    };

    let cors_layer = build_cors_layer(&config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server().port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
