//! Image references accepted by the reader.
//!
//! [`ImageReference`] is a closed set: every reader entry point matches on it
//! exhaustively, so adding a new kind of source is a compile-time decision.

use image::DynamicImage;
use ndarray::ArrayD;
use std::fmt;
use std::path::PathBuf;

/// Where an image comes from.
///
/// The reader only borrows a reference; caller-owned pixel buffers and decoded
/// images are never mutated.
#[derive(Debug, Clone)]
pub enum ImageReference {
    /// Local file, opened directly.
    Path(PathBuf),
    /// `http://` or `https://` resource, fetched with a blocking GET.
    Url(String),
    /// Raw 8-bit pixels, channel-last `HxWxC` or channel-first `CxHxW`.
    PixelBuffer(ArrayD<u8>),
    /// An image that has already been decoded.
    Decoded(DynamicImage),
}

impl ImageReference {
    /// Classify a string as a URL or a filesystem path by its scheme prefix.
    pub fn from_location(location: &str) -> Self {
        if is_url(location) {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }

    /// Short label for log lines and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::PixelBuffer(array) => format!("pixel buffer {:?}", array.shape()),
            Self::Decoded(img) => format!("decoded image {}x{}", img.width(), img.height()),
        }
    }
}

impl From<&str> for ImageReference {
    fn from(location: &str) -> Self {
        Self::from_location(location)
    }
}

impl From<String> for ImageReference {
    fn from(location: String) -> Self {
        Self::from_location(&location)
    }
}

impl From<PathBuf> for ImageReference {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<DynamicImage> for ImageReference {
    fn from(img: DynamicImage) -> Self {
        Self::Decoded(img)
    }
}

impl From<ArrayD<u8>> for ImageReference {
    fn from(array: ArrayD<u8>) -> Self {
        Self::PixelBuffer(array)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Literal prefix check, case-sensitive like the scheme strings users paste.
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn https_prefix_is_url() {
        let r = ImageReference::from_location("https://example.com/a.jpg");
        assert!(matches!(r, ImageReference::Url(u) if u == "https://example.com/a.jpg"));
    }

    #[test]
    fn http_prefix_is_url() {
        assert!(is_url("http://localhost:8000/b.png"));
    }

    #[test]
    fn other_strings_are_paths() {
        let r = ImageReference::from("photos/before.jpg");
        assert!(matches!(r, ImageReference::Path(p) if p == PathBuf::from("photos/before.jpg")));
        assert!(!is_url("ftp://example.com/a.jpg"));
        assert!(!is_url("/tmp/http://weird.jpg"));
    }

    #[test]
    fn describe_pixel_buffer_shows_shape() {
        let r = ImageReference::from(ArrayD::<u8>::zeros(IxDyn(&[4, 6, 3])));
        assert_eq!(r.describe(), "pixel buffer [4, 6, 3]");
    }

    #[test]
    fn describe_decoded_shows_dimensions() {
        let r = ImageReference::from(DynamicImage::new_rgb8(10, 20));
        assert_eq!(r.to_string(), "decoded image 10x20");
    }
}
