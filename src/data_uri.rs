//! `data:` URI encoding and decoding.
//!
//! Only the base64 form is produced. Decoding accepts the base64 form and
//! rejects anything else, which is all the blob endpoint and the renderer need.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,
    #[error("data URI is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn is_data_uri(s: &str) -> bool {
    s.starts_with("data:")
}

/// Build `data:<mime>;base64,<payload>`.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a data URI into its MIME type and the still-encoded payload.
fn split(s: &str) -> Result<(&str, &str), DataUriError> {
    let rest = s.strip_prefix("data:").ok_or(DataUriError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::NotDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;
    Ok((mime, payload))
}

/// Check the header shape without decoding the payload.
pub fn validate_header(s: &str) -> Result<(), DataUriError> {
    split(s).map(|_| ())
}

pub fn decode(s: &str) -> Result<DataUri, DataUriError> {
    let (mime, payload) = split(s)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::Payload(e.to_string()))?;
    Ok(DataUri {
        mime: mime.to_string(),
        bytes,
    })
}
