//! Shared test utilities for the erawrapped workspace
//!
//! This crate provides a mock LLM server and synthetic streaming-history
//! fixture builders used across the `erawrapped-core` and `erawrapped-api`
//! test suites.
//!
//! # Example
//!
//! ```rust,ignore
//! use erawrapped_test_utils::MockLlmServer;
//!
//! #[tokio::test]
//! async fn test_with_mock() {
//!     let server = MockLlmServer::start().await;
//!     server.mock_chat_success(r#"{"title":"...","summary":"..."}"#).await;
//!     // use server.url() to configure your client
//! }
//! ```

mod fixtures;
mod ollama;

pub use fixtures::{repeated_plays, streaming_history_json, RawEntry};
pub use ollama::MockLlmServer;
