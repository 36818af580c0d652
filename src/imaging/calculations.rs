//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size with the source's aspect ratio that fits a box.
///
/// The scale factor is `min(box_w / src_w, box_h / src_h)`, applied to both
/// sides and rounded to the nearest pixel. Neither side drops below 1, so the
/// result may fall short of the box on one axis but never exceeds it by more
/// than rounding.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height), both non-zero
/// * `bounds` - Bounding box (width, height)
///
/// # Returns
/// * `(width, height)` - Fitted dimensions
///
/// # Examples
/// ```
/// # use icolib::imaging::calculate_fit_dimensions;
/// // 100x50 into a 40x40 box → 0.4 scale → 40x20
/// assert_eq!(calculate_fit_dimensions((100, 50), (40, 40)), (40, 20));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;

    let scale = (box_w as f64 / src_w as f64).min(box_h as f64 / src_h as f64);

    let w = (src_w as f64 * scale).round().max(1.0) as u32;
    let h = (src_h as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Ratio of source pixels per destination pixel along one axis.
pub fn scale_ratio(source_len: u32, target_len: u32) -> f64 {
    source_len as f64 / target_len as f64
}
