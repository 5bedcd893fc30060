//! LLM client abstraction used by erawrapped for era naming
//!
//! This crate defines the [`LlmClient`] trait (a single `chat` call plus a
//! readiness check) and [`OllamaLlmClient`], the Ollama-backed
//! implementation used in production.
//!
//! # Requirements
//!
//! - Ollama must be running and accessible at the configured URL
//! - The configured model must be pulled before use:
//!   ```bash
//!   ollama pull mistral
//!   ```
//!
//! # Thread Safety
//!
//! `OllamaLlmClient` is `Clone + Send + Sync` and can be safely shared
//! across threads. It uses a shared HTTP client connection pool.
//!
//! # Example
//!
//! ```no_run
//! use erawrapped_llm_client::{LlmClient, OllamaLlmClient};
//! use erawrapped_shared_config::OllamaConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OllamaConfig::default();
//! let client = OllamaLlmClient::new(&config)?;
//!
//! let response = client.chat("Name this era of listening in 2-4 words.").await?;
//! println!("Response: {}", response);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::{LlmClient, OllamaLlmClient};
pub use error::{LlmError, LlmResult};
pub use models::{
    ChatMessage, ChatRequest, ChatResponse, ChatRole, GenerateOptions, ListModelsResponse,
    ModelInfo,
};
