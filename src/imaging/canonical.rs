//! The pipeline's normalized in-memory image.

use image::metadata::Orientation;
use image::{DynamicImage, RgbImage};

/// Decoded image in canonical form: 8-bit RGB, row-major, no alpha.
///
/// Carries the EXIF orientation of its source (if any) until the
/// [orientation corrector](super::orientation::correct) consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalImage {
    pixels: RgbImage,
    orientation: Option<Orientation>,
}

impl CanonicalImage {
    /// Normalize any decoded image to RGB8. Alpha is dropped, gray is replicated.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::from_rgb(img.to_rgb8())
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self {
            pixels,
            orientation: None,
        }
    }

    /// Attach the orientation tag read from the source's metadata.
    ///
    /// `NoTransforms` (EXIF 1) is stored as absent.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = (orientation != Orientation::NoTransforms).then_some(orientation);
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbImage {
        self.pixels
    }

    /// Orientation still pending on this image, `None` once corrected or if the
    /// source carried none.
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    pub(crate) fn into_parts(self) -> (RgbImage, Option<Orientation>) {
        (self.pixels, self.orientation)
    }
}
