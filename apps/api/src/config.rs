//! API server configuration: a thin wrapper around `CommonConfig`

use anyhow::Result;
use erawrapped_shared_config::{CommonConfig, Environment, OllamaConfig, ServerConfig};

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common =
            CommonConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self { common })
    }

    /// Get HTTP server/session tuning
    pub fn server(&self) -> &ServerConfig {
        &self.common.server
    }

    /// Get Ollama configuration
    pub fn ollama(&self) -> &OllamaConfig {
        &self.common.ollama
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }

    /// Configured CORS allowed origins, if any
    pub fn cors_allowed_origins(&self) -> Option<&[String]> {
        self.common.cors_allowed_origins.as_deref()
    }
}
