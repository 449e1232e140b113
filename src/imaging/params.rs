//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides the output size, and the
//! [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`] — JPEG quality (1–100, default 75). Clamped on construction.
//! - [`PrepareParams`] — thumbnail preparation request: max width + quality.
//! - [`ResizeParams`] — exact output dimensions handed to the backend.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// What to produce from an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareParams {
    /// Images wider than this are scaled down to exactly this width.
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for PrepareParams {
    fn default() -> Self {
        Self {
            max_width: 400,
            quality: Quality::default(),
        }
    }
}

/// Parameters for a single resize + encode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn prepare_defaults_match_thumbnail_settings() {
        let p = PrepareParams::default();
        assert_eq!(p.max_width, 400);
        assert_eq!(p.quality.value(), 75);
    }
}
