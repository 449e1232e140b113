//! Image preparation — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//! | **Embed** | base64 `data:image/jpeg` URI |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_fit_width;
pub use operations::{PREPARED_MIME, PreparedImage, get_dimensions, prepare_image};
pub use params::{PrepareParams, Quality, ResizeParams};
pub use rust_backend::{RustBackend, declared_mime, is_image_mime, supported_input_extensions};
