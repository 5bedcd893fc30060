//! `POST /upload`: multipart upload, parsed into a new session

use axum::extract::{Multipart, State};
use axum::Json;
use erawrapped_core::UploadKind;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: String,
}

const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// Identify the upload kind from magic bytes first, falling back to the
/// field's declared filename extension.
fn detect_kind(bytes: &[u8], filename: Option<&str>) -> Result<UploadKind, ApiError> {
    if bytes.starts_with(ZIP_MAGIC) {
        return Ok(UploadKind::Zip);
    }

    match filename.map(|f| f.to_lowercase()) {
        Some(name) if name.ends_with(".zip") => Ok(UploadKind::Zip),
        Some(name) if name.ends_with(".json") => Ok(UploadKind::Json),
        _ => {
            // Not a ZIP by magic bytes and no recognized extension; assume JSON,
            // the parser itself will reject anything that isn't valid JSON.
            Ok(UploadKind::Json)
        }
    }
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::ValidationError(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::ValidationError(format!("failed to read upload: {e}")))?;
            file_bytes = Some(data.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::ValidationError("missing upload".to_string()))?;

    if bytes.len() as u64 > state.server_config.max_upload_bytes {
        return Err(ApiError::ValidationError("upload exceeds maximum size".to_string()));
    }

    let kind = detect_kind(&bytes, filename.as_deref())?;
    let events = erawrapped_core::parse(&bytes, kind)?;

    let session_id = state.sessions.create(events).await;

    info!(%session_id, "session created from upload");

    Ok(Json(UploadResponse {
        session_id: session_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind_by_magic_bytes() {
        let bytes = [0x50, 0x4B, 0x03, 0x04, 0, 0];
        assert_eq!(detect_kind(&bytes, Some("upload.bin")).unwrap(), UploadKind::Zip);
    }

    #[test]
    fn test_detect_kind_by_extension_fallback() {
        let bytes = b"[]";
        assert_eq!(detect_kind(bytes, Some("history.zip")).unwrap(), UploadKind::Zip);
        assert_eq!(detect_kind(bytes, Some("history.json")).unwrap(), UploadKind::Json);
    }

    #[test]
    fn test_detect_kind_defaults_to_json() {
        let bytes = b"[]";
        assert_eq!(detect_kind(bytes, None).unwrap(), UploadKind::Json);
    }
}
