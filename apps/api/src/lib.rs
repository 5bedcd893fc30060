//! erawrapped API library
//!
//! Exposes the router builder and shared state for the binary entry point
//! and for integration tests.

pub mod config;
pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{build_router, AppState};
