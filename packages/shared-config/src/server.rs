//! HTTP server tuning configuration

use crate::{parse_env, ConfigResult};

/// Server-side HTTP/session tuning shared by the API binary and the session store
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,

    /// Maximum accepted upload size, in bytes
    pub max_upload_bytes: u64,

    /// Session idle TTL, in seconds, after which the sweeper reclaims it
    pub session_ttl_secs: u64,

    /// Interval, in seconds, at which the TTL sweeper runs
    pub sweep_interval_secs: u64,

    /// Interval, in milliseconds, at which the progress SSE stream polls
    pub progress_poll_interval_ms: u64,

    /// Hard ceiling, in seconds, on a single progress SSE connection
    pub progress_stream_ceiling_secs: u64,
}

impl ServerConfig {
    /// Load server configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            port: parse_env("PORT", 8080)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 500 * 1024 * 1024)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 3600)?,
            sweep_interval_secs: parse_env("SESSION_SWEEP_INTERVAL_SECS", 60)?,
            progress_poll_interval_ms: parse_env("PROGRESS_POLL_INTERVAL_MS", 500)?,
            progress_stream_ceiling_secs: parse_env("PROGRESS_STREAM_CEILING_SECS", 300)?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_upload_bytes: 500 * 1024 * 1024,
            session_ttl_secs: 3600,
            sweep_interval_secs: 60,
            progress_poll_interval_ms: 500,
            progress_stream_ceiling_secs: 300,
        }
    }
}
