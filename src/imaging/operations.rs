//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_width;
use super::params::{PrepareParams, ResizeParams};
use crate::data_uri;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// MIME type of every prepared image.
pub const PREPARED_MIME: &str = "image/jpeg";

/// A thumbnail ready to embed or publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Plan the resize without executing it.
pub fn plan_prepare(original: (u32, u32), params: &PrepareParams) -> ResizeParams {
    let (width, height) = calculate_fit_width(original, params.max_width);
    ResizeParams {
        width,
        height,
        quality: params.quality,
    }
}

/// Downsample an uploaded image to at most `max_width` and return it as a
/// JPEG data URI.
///
/// Images already narrower than the cap are re-encoded at their own size.
/// Malformed input is an error; nothing partial is returned.
pub fn prepare_image(
    backend: &impl ImageBackend,
    bytes: &[u8],
    params: &PrepareParams,
) -> Result<PreparedImage> {
    let original = get_dimensions(backend, bytes)?;
    if original.0 == 0 || original.1 == 0 {
        return Err(BackendError::Decode("image has no pixels".into()));
    }
    let resize = plan_prepare(original, params);
    let jpeg = backend.resize_to_jpeg(bytes, &resize)?;

    Ok(PreparedImage {
        data_uri: data_uri::encode(PREPARED_MIME, &jpeg),
        width: resize.width,
        height: resize.height,
    })
}
