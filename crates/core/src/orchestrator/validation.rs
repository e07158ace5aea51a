//! Submission input checks, applied before anything is uploaded

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use calrelay_domain::constants::{
    ALLOWED_UPLOAD_MIME_TYPES, MAX_TEXT_INPUT_LENGTH, MAX_UPLOAD_BYTES,
};
use calrelay_domain::{CalRelayError, Result};

/// Returns the trimmed text when it is non-empty and within the length limit.
pub fn validate_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalRelayError::InvalidInput("Text is empty".into()));
    }

    let length = trimmed.chars().count();
    if length > MAX_TEXT_INPUT_LENGTH {
        return Err(CalRelayError::InvalidInput(format!(
            "Text is too long ({length} characters, limit {MAX_TEXT_INPUT_LENGTH})"
        )));
    }

    Ok(trimmed)
}

/// Checks the MIME type and decodes the base64 payload within the size limit.
pub fn decode_upload(file_name: &str, mime_type: &str, data: &str) -> Result<Vec<u8>> {
    if file_name.trim().is_empty() {
        return Err(CalRelayError::InvalidInput("File name is empty".into()));
    }

    let mime = mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_UPLOAD_MIME_TYPES.contains(&mime.as_str()) {
        return Err(CalRelayError::InvalidInput(format!("Unsupported file type: {mime_type}")));
    }

    // Base64 expands by 4/3; reject obviously oversized payloads before decoding.
    if data.len() / 4 * 3 > MAX_UPLOAD_BYTES + 3 {
        return Err(too_large());
    }

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|err| CalRelayError::InvalidInput(format!("File data is not base64: {err}")))?;

    if bytes.is_empty() {
        return Err(CalRelayError::InvalidInput("File is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(too_large());
    }

    Ok(bytes)
}

fn too_large() -> CalRelayError {
    CalRelayError::InvalidInput(format!(
        "File is too large (limit {} MB)",
        MAX_UPLOAD_BYTES / (1024 * 1024)
    ))
}
