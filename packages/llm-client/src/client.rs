//! LLM client trait abstraction and the Ollama HTTP implementation

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use erawrapped_shared_config::OllamaConfig;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};
use crate::models::{ChatMessage, ChatRequest, ChatResponse, GenerateOptions, ListModelsResponse};

/// Maximum error body size to prevent memory exhaustion
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// A chat-capable LLM backend, abstracted so era naming does not depend on
/// any one provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single user prompt and return the assistant's reply text
    async fn chat(&self, prompt: &str) -> LlmResult<String>;

    /// Check whether the backend is reachable and ready to serve requests
    async fn health_check(&self) -> LlmResult<bool>;
}

/// Ollama-backed `LlmClient` with retry logic and connection pooling
#[derive(Debug, Clone)]
pub struct OllamaLlmClient {
    http_client: Client,
    config: OllamaConfig,
    retry_attempts: u32,
    retry_base_delay_ms: u64,
}

impl OllamaLlmClient {
    /// Create a new client from configuration
    pub fn new(config: &OllamaConfig) -> LlmResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            http_client,
            config: config.clone(),
            retry_attempts: config.retry_attempts,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    /// Create a client with a custom HTTP client (for testing)
    pub fn with_client(config: &OllamaConfig, http_client: Client) -> Self {
        Self {
            http_client,
            config: config.clone(),
            retry_attempts: config.retry_attempts,
            retry_base_delay_ms: config.retry_base_delay_ms,
        }
    }

    /// Override retry configuration
    pub fn with_retry_config(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Execute an async operation with retry logic
    async fn with_retry<T, F, Fut>(&self, operation: F) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LlmResult<T>>,
    {
        if self.retry_attempts == 0 {
            return operation().await;
        }

        let mut last_error = None;

        for attempt in 0..self.retry_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    } else if attempt < self.retry_attempts - 1 {
                        let delay = self.retry_base_delay_ms * 2_u64.pow(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry_attempts,
                            delay_ms = delay,
                            error = %e,
                            "Retrying after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        last_error = Some(e);
                    } else {
                        last_error = Some(e);
                        break;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.retry_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Truncate an error body to prevent memory exhaustion.
    /// Safely handles UTF-8 boundaries to avoid panics on multi-byte characters.
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    /// List available models (used by the readiness check)
    async fn list_models(&self) -> LlmResult<Vec<String>> {
        let response = self
            .http_client
            .get(self.config.tags_url())
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ConnectionRefused(self.config.url.clone())
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
            return Err(LlmError::ApiError(format!("Status {}: {}", status, body)));
        }

        let list: ListModelsResponse = response.json().await?;
        Ok(list.models.into_iter().map(|m| m.name).collect())
    }

    /// Single chat request, no retry
    async fn chat_internal(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            options: Some(GenerateOptions {
                temperature: Some(self.config.temperature),
                num_predict: Some(self.config.max_tokens),
            }),
        };

        let response = self
            .http_client
            .post(self.config.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ConnectionRefused(self.config.url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());

            if body.contains("model") && body.contains("not found") {
                return Err(LlmError::ModelNotFound(self.config.model.clone()));
            }

            return Err(LlmError::ApiError(format!("Status {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl LlmClient for OllamaLlmClient {
    async fn chat(&self, prompt: &str) -> LlmResult<String> {
        let messages = vec![ChatMessage::user(prompt)];

        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending chat request"
        );

        let result = self
            .with_retry(|| {
                let messages = messages.clone();
                async move { self.chat_internal(&messages).await }
            })
            .await?;

        debug!(response_len = result.len(), "Chat response received");

        Ok(result)
    }

    async fn health_check(&self) -> LlmResult<bool> {
        match self.list_models().await {
            Ok(models) => {
                let model_base = self.config.model.split(':').next().unwrap_or(&self.config.model);
                Ok(models
                    .iter()
                    .any(|m| m.split(':').next().unwrap_or(m) == model_base))
            }
            Err(LlmError::ConnectionRefused(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_url: &str) -> OllamaConfig {
        OllamaConfig {
            url: server_url.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 30,
            max_tokens: 300,
            temperature: 0.7,
            retry_attempts: 3,
            retry_base_delay_ms: 1,
        }
    }

    #[test]
    fn test_client_creation() {
        let config = OllamaConfig::default();
        let client = OllamaLlmClient::new(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_with_retry_configuration() {
        let config = OllamaConfig::default();
        let client = OllamaLlmClient::new(&config)
            .unwrap()
            .with_retry_config(5, 1000);
        assert_eq!(client.retry_attempts, 5);
        assert_eq!(client.retry_base_delay_ms, 1000);
    }

    #[test]
    fn test_truncate_error_body() {
        let short = "short error".to_string();
        assert_eq!(OllamaLlmClient::truncate_error_body(short.clone()), short);

        let long = "x".repeat(2000);
        let truncated = OllamaLlmClient::truncate_error_body(long);
        assert!(truncated.len() < 1100);
        assert!(truncated.ends_with("... (truncated)"));
    }

    #[test]
    fn test_truncate_error_body_utf8_boundary() {
        let utf8_str = "日".repeat(500);
        let truncated = OllamaLlmClient::truncate_error_body(utf8_str);
        assert!(truncated.ends_with("... (truncated)"));
        let _ = truncated.chars().count();
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "Summer Shoegaze"},
                "done": true
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = OllamaLlmClient::new(&config).unwrap();

        let result = client.chat("name this era").await.unwrap();
        assert_eq!(result, "Summer Shoegaze");
    }

    #[tokio::test]
    async fn test_chat_retries_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "ok"},
                "done": true
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = OllamaLlmClient::new(&config).unwrap();

        let result = client.chat("prompt").await.unwrap();
        assert_eq!(result, "ok");
    }

    #[tokio::test]
    async fn test_chat_model_not_found_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'test-model' not found"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = OllamaLlmClient::new(&config).unwrap();

        let result = client.chat("prompt").await;
        assert!(matches!(result, Err(LlmError::ModelNotFound(_))));
    }

    #[tokio::test]
    async fn test_chat_retries_exhausted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = OllamaLlmClient::new(&config).unwrap();

        let result = client.chat("prompt").await;
        assert!(matches!(result, Err(LlmError::RetriesExhausted { .. })));
    }

    #[tokio::test]
    async fn test_health_check_model_present() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "test-model:latest", "size": 123}]
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = OllamaLlmClient::new(&config).unwrap();

        assert!(client.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_connection_refused() {
        let config = test_config("http://127.0.0.1:1");
        let client = OllamaLlmClient::new(&config).unwrap();

        assert!(!client.health_check().await.unwrap());
    }
}
