//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output size for a width-capped downsample.
///
/// Images wider than `max_width` are scaled proportionally so the width is
/// exactly `max_width`, with the height rounded to the nearest pixel. Narrower
/// images keep their size: this never upscales.
///
/// # Examples
/// ```
/// # use link_gallery::imaging::calculate_fit_width;
/// assert_eq!(calculate_fit_width((1600, 900), 800), (800, 450));
/// assert_eq!(calculate_fit_width((300, 200), 400), (300, 200));
/// ```
pub fn calculate_fit_width(original: (u32, u32), max_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w <= max_width || orig_w == 0 {
        return original;
    }
    let scale = max_width as f64 / orig_w as f64;
    let h = (orig_h as f64 * scale).round() as u32;
    // A very wide, very short image must not collapse to zero rows
    (max_width, h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_exactly() {
        assert_eq!(calculate_fit_width((1600, 900), 800), (800, 450));
    }

    #[test]
    fn rounds_height_to_nearest() {
        // 1000x333 → 400 x 133.2
        assert_eq!(calculate_fit_width((1000, 333), 400), (400, 133));
        // 1000x334 → 400 x 133.6
        assert_eq!(calculate_fit_width((1000, 334), 400), (400, 134));
    }

    #[test]
    fn portrait_is_capped_by_width() {
        assert_eq!(calculate_fit_width((800, 1200), 400), (400, 600));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(calculate_fit_width((300, 200), 400), (300, 200));
        assert_eq!(calculate_fit_width((400, 200), 400), (400, 200));
    }

    #[test]
    fn extreme_panorama_keeps_one_row() {
        assert_eq!(calculate_fit_width((10000, 2), 400), (400, 1));
    }
}
