//! Pure calculation functions for display geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Height scale applied on top of the source aspect ratio so the slider
/// handle and labels fit inside the hosting frame without a scrollbar.
const HEIGHT_FACTOR: f64 = 0.95;

/// Pixel size the hosting surface must declare for the comparison widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
}

impl DisplayGeometry {
    /// Derive the display size from the first image's dimensions.
    ///
    /// # Arguments
    /// * `source` - Source image dimensions as (width, height)
    /// * `width` - Requested component width in pixels
    ///
    /// # Examples
    /// ```
    /// # use image_comparison::imaging::DisplayGeometry;
    /// // 1000x500 source at 700px wide → floor(700 * 0.5 * 0.95) = 332
    /// let geometry = DisplayGeometry::from_source((1000, 500), 700);
    /// assert_eq!(geometry.height, 332);
    /// ```
    pub fn from_source(source: (u32, u32), width: u32) -> Self {
        Self {
            width,
            height: display_height(source, width),
        }
    }
}

/// `floor(width * (source_height / source_width) * 0.95)`.
///
/// A zero-width source yields a zero height rather than dividing by zero.
pub fn display_height(source: (u32, u32), width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 0;
    }
    let h_to_w = src_h as f64 / src_w as f64;
    (width as f64 * h_to_w * HEIGHT_FACTOR).floor() as u32
}
