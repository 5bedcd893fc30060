//! Ollama AI configuration types

use crate::{get_env_or_default, parse_env, ConfigResult};

/// Ollama AI service configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub url: String,

    /// LLM model used for era naming (e.g., mistral, llama2)
    pub model: String,

    /// Per-call request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum output tokens per call
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,

    /// Number of attempts (including the first) before giving up
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts, in milliseconds
    pub retry_base_delay_ms: u64,
}

impl OllamaConfig {
    /// Load Ollama configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            url: get_env_or_default("OLLAMA_URL", "http://localhost:11434"),
            model: get_env_or_default("OLLAMA_MODEL", "mistral"),
            timeout_secs: parse_env("OLLAMA_TIMEOUT", 30)?,
            max_tokens: parse_env("OLLAMA_MAX_TOKENS", 300)?,
            temperature: parse_env("OLLAMA_TEMPERATURE", 0.7)?,
            retry_attempts: parse_env("OLLAMA_RETRY_ATTEMPTS", 3)?,
            retry_base_delay_ms: parse_env("OLLAMA_RETRY_BASE_DELAY_MS", 1000)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Get the full URL for the chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.url.trim_end_matches('/'))
    }

    /// Get the full URL for the tags endpoint (used for health checks)
    pub fn tags_url(&self) -> String {
        format!("{}/api/tags", self.url.trim_end_matches('/'))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout_secs: 30,
            max_tokens: 300,
            temperature: 0.7,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
        }
    }
}
