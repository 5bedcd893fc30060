//! Error types for the LLM client abstraction

use thiserror::Error;

/// Errors that can occur when talking to an LLM backend
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The backend returned an application-level error
    #[error("LLM backend error: {0}")]
    ApiError(String),

    /// Model not found or not pulled
    #[error("Model not found: {0}. Try running 'ollama pull {0}'")]
    ModelNotFound(String),

    /// Request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid response from the backend
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Connection refused (backend not running)
    #[error("Connection refused. Is the LLM backend running at {0}?")]
    ConnectionRefused(String),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl LlmError {
    /// Check if this error is retryable (transient)
    ///
    /// Only retry on:
    /// - Timeouts
    /// - Connection refused
    /// - HTTP transport errors (connect, timeout)
    /// - Server errors (5xx) and rate limiting (429)
    ///
    /// Does NOT retry on client errors (4xx except 429).
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) | LlmError::ConnectionRefused(_) => true,
            LlmError::HttpError(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error() || status.as_u16() == 429)
            }
            _ => false,
        }
    }
}

/// Result type for LLM client operations
pub type LlmResult<T> = Result<T, LlmError>;
