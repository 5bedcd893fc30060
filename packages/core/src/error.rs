//! Error types for parsing, segmentation and the pipeline driver

use erawrapped_llm_client::LlmError;
use thiserror::Error;

/// Errors from ingesting raw upload bytes
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("hostile archive member path: {0}")]
    PathTraversal(String),

    #[error("archive uncompressed size exceeds the 1 GiB limit")]
    ArchiveTooLarge,

    #[error("no Streaming_History_Audio_*.json members found in archive")]
    NoHistoryMembers,

    #[error("unrecognized upload kind")]
    UnrecognizedKind,

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors from the (currently infallible) segmenter, kept for symmetry with
/// the rest of the pipeline's error taxonomy
#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("segmentation failed: {0}")]
    Internal(String),
}

/// Errors from the pipeline driver. A session-ending failure surfaces here
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no distinct eras found")]
    NoErasFound,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("{0}")]
    Internal(String),
}
