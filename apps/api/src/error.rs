//! API error handling: a single unified `ApiError`
//!
//! Every variant maps to a status code and the `{"error": "<message>"}`
//! response shape.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use erawrapped_core::{ParseError, PipelineError};
use erawrapped_llm_client::LlmError;
use serde::Serialize;
use thiserror::Error;

/// API error response body: `{"error": "<message>"}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing upload, unrecognized file kind, malformed JSON, hostile archive, non-integer era id
    #[error("{0}")]
    ValidationError(String),

    /// Unknown session or era id
    #[error("{0}")]
    NotFound(String),

    /// Read issued while stage is not `complete` or `error`
    #[error("Processing not complete")]
    NotReady { stage: String },

    /// Pipeline reached `error` (e.g. "No distinct eras found")
    #[error("{0}")]
    FailedProcessing(String),

    #[error("AI service error: {0}")]
    Ai(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::FailedProcessing(err.to_string())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotReady { .. } => StatusCode::from_u16(425).expect("valid status code"),
            Self::FailedProcessing(_) => StatusCode::BAD_REQUEST,
            Self::Ai(_) | Self::Io(_) | Self::Zip(_) | Self::Json(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotReady { .. } => "NOT_READY",
            Self::FailedProcessing(_) => "FAILED_PROCESSING",
            Self::Ai(_) => "AI_SERVICE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Zip(_) => "ZIP_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "server error");
        } else if status.as_u16() == 425 {
            tracing::debug!(error = %self, code = self.error_code(), "not ready");
        } else {
            tracing::warn!(error = %self, code = self.error_code(), "client error");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();

        if let Self::NotReady { stage } = &self {
            return (
                status,
                Json(ErrorResponse {
                    error: "Processing not complete".to_string(),
                    stage: Some(stage.clone()),
                }),
            )
                .into_response();
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                stage: None,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
