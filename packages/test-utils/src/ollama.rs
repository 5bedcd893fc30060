//! Mock LLM server for testing era naming
//!
//! Provides a [`MockLlmServer`] that simulates the Ollama chat/tags endpoints
//! for testing era naming without a real LLM instance.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Ollama-compatible server for era naming tests
///
/// Wraps a [`wiremock::MockServer`] and provides convenience methods for
/// setting up chat/tags responses.
///
/// # Example
///
/// ```rust,ignore
/// use erawrapped_test_utils::MockLlmServer;
///
/// #[tokio::test]
/// async fn test_naming() {
///     let server = MockLlmServer::start().await;
///     server.mock_chat_success(r#"{"title":"Summer Shoegaze","summary":"..."}"#).await;
///     // configure an OllamaLlmClient with server.url()
/// }
/// ```
pub struct MockLlmServer {
    server: MockServer,
}

impl MockLlmServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Mount a mock for a successful chat completion
    pub async fn mock_chat_success(&self, response_text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mistral",
                "message": {
                    "role": "assistant",
                    "content": response_text
                },
                "done": true
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a chat completion failure
    pub async fn mock_chat_failure(&self, status_code: u16, error_message: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(status_code).set_body_json(json!({
                    "error": error_message
                })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the `/api/tags` readiness endpoint
    pub async fn mock_list_models(&self, models: &[&str]) {
        let model_list: Vec<serde_json::Value> = models
            .iter()
            .map(|name| json!({"name": name, "size": 4_000_000_000_i64}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": model_list
            })))
            .mount(&self.server)
            .await;
    }

    /// Get a reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_server_starts() {
        let server = MockLlmServer::start().await;
        assert!(server.url().starts_with("http://"));
    }

    #[tokio::test]
    async fn test_mock_chat() {
        let server = MockLlmServer::start().await;
        server.mock_chat_success("Hello, world!").await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/api/chat", server.url()))
            .json(&serde_json::json!({
                "model": "mistral",
                "messages": [{"role": "user", "content": "Hi"}]
            }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"]["content"], "Hello, world!");
    }

    #[tokio::test]
    async fn test_mock_list_models() {
        let server = MockLlmServer::start().await;
        server.mock_list_models(&["mistral"]).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/api/tags", server.url()))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["models"].as_array().unwrap().len(), 1);
    }
}
