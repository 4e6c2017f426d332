//! EXIF orientation correction.
//!
//! | EXIF tag | Stored as | Transform applied |
//! |---|---|---|
//! | 1 | normal | none |
//! | 2 | mirrored | horizontal flip |
//! | 3 | upside down | 180° rotation |
//! | 4 | mirrored upside down | vertical flip |
//! | 5 | transposed | flip across the top-left/bottom-right diagonal |
//! | 6 | rotated 90° CCW | 90° clockwise rotation |
//! | 7 | transversed | flip across the anti-diagonal |
//! | 8 | rotated 90° CW | 90° counter-clockwise rotation |

use super::canonical::CanonicalImage;
use image::RgbImage;
use image::imageops;
use image::metadata::Orientation;

/// Apply the image's pending orientation and clear it.
///
/// Images without an orientation, or tagged 1, come back pixel-equal.
pub fn correct(image: CanonicalImage) -> CanonicalImage {
    let (pixels, orientation) = image.into_parts();
    match orientation {
        Some(orientation) => {
            log::debug!("applying EXIF orientation {}", orientation.to_exif());
            CanonicalImage::from_rgb(apply(pixels, orientation))
        }
        None => CanonicalImage::from_rgb(pixels),
    }
}

/// Rotate/mirror `pixels` so visual "up" matches data "up".
pub fn apply(pixels: RgbImage, orientation: Orientation) -> RgbImage {
    match orientation {
        Orientation::NoTransforms => pixels,
        Orientation::FlipHorizontal => imageops::flip_horizontal(&pixels),
        Orientation::Rotate180 => imageops::rotate180(&pixels),
        Orientation::FlipVertical => imageops::flip_vertical(&pixels),
        // transpose
        Orientation::Rotate90FlipH => imageops::flip_horizontal(&imageops::rotate90(&pixels)),
        Orientation::Rotate90 => imageops::rotate90(&pixels),
        // transverse
        Orientation::Rotate270FlipH => imageops::flip_horizontal(&imageops::rotate270(&pixels)),
        Orientation::Rotate270 => imageops::rotate270(&pixels),
    }
}
