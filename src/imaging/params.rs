//! Parameter types for image operations.
//!
//! These types describe *how* an operation should be carried out, not what it
//! operates on. They are shared between the [`reader`](super::reader) (decode
//! side) and the [`encoder`](super::encoder) (encode side).
//!
//! ## Types
//!
//! - [`Quality`] — JPEG encoding quality (1–100, default 100). Clamped on construction.
//! - [`ReadOptions`] — Per-call decode settings: orientation correction, pixel
//!   ceilings, network timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quality setting for JPEG encoding (1-100).
///
/// Comparison payloads default to 100: the slider is meant to show the
/// difference between two images, not compression artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

impl From<u8> for Quality {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Settings threaded through a single [`read`](super::reader::read) call.
///
/// Nothing here is process-global: two reads with different options never
/// influence each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Apply the EXIF orientation tag of path/URL sources after decoding.
    pub correct_orientation: bool,
    /// Lift the decoders' allocation and dimension ceilings for this read.
    pub allow_large_images: bool,
    /// Upper bound on a URL fetch. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            correct_orientation: false,
            allow_large_images: true,
            fetch_timeout: None,
        }
    }
}
