//! Image ingestion and normalization — pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | **Fallback decode** (large / multi-page TIFF) | `tiff` crate, feature `tiff-fallback` |
//! | **Fetch** | `reqwest::blocking` |
//! | **Orientation** | `image::imageops` flips and rotations |
//! | **Encode → JPEG data URI** | `JpegEncoder` + `base64` |
//!
//! The module is split into:
//! - **Source**: [`ImageReference`], the closed set of accepted inputs
//! - **Reader**: [`read`] plus the fallback decoder and URL fetch
//! - **Orientation**: EXIF-driven rotation/mirroring
//! - **Encoder**: [`encode`], [`EncodedPayload`], [`ScratchArea`]
//! - **Calculations**: Pure functions for display geometry (unit testable)
//! - **Parameters**: [`Quality`], [`ReadOptions`]

mod calculations;
mod canonical;
pub mod encoder;
pub mod fallback;
mod fetch;
pub mod orientation;
mod params;
pub mod reader;
mod source;

pub use calculations::{DisplayGeometry, display_height};
pub use canonical::CanonicalImage;
pub use encoder::{EncodeError, EncodeMode, EncodedPayload, ScratchArea, encode, encode_file};
pub use params::{Quality, ReadOptions};
pub use reader::{ReadError, read, read_encoded, read_path};
pub use source::{ImageReference, is_url};
