//! `data:` URI decoding for images embedded in prediction bodies.

use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI is not base64-encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

/// Decoded contents of a `data:<media-type>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// File extension matching the media type, `bin` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            _ => "bin",
        }
    }
}

/// Decode a base64 data URI. Plain URLs are rejected with [`DataUriError::NotDataUri`].
pub fn decode_data_uri(uri: &str) -> Result<DataUri, DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::NotDataUri)?;

    let media_type = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;
    let media_type = if media_type.is_empty() {
        "text/plain".to_string()
    } else {
        media_type.to_string()
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::Payload(e.to_string()))?;

    Ok(DataUri { media_type, bytes })
}
