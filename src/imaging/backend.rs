//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations image preparation
//! needs: identify (read dimensions) and resize (resample + JPEG encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the recording
//! mock in this module.

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unrecognized image data: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Both operations take the raw uploaded bytes, so nothing touches the disk.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where possible.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, resample to exactly `params.width` x `params.height`, and
    /// encode as JPEG. Returns the encoded bytes.
    fn resize_to_jpeg(&self, bytes: &[u8], params: &ResizeParams) -> Result<Vec<u8>, BackendError>;
}
