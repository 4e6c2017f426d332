//! Source reader: any [`ImageReference`] in, [`CanonicalImage`] out.
//!
//! ```text
//! Decoded      ──────────────────────────────► to RGB
//! PixelBuffer  ── channel order ─────────────► to RGB
//! Path / Url   ── bytes ── primary decoder ──► to RGB ── orientation?
//!                               │ fails
//!                               └─ fallback ─► to RGB ── orientation?
//! ```
//!
//! Only decoder failures reach the fallback. A missing file, a permission
//! problem or a failed fetch is reported as-is, so the caller never sees a
//! misleading "missing dependency" message for an unrelated cause.

use super::canonical::CanonicalImage;
use super::fallback;
use super::fetch;
use super::orientation;
use super::params::ReadOptions;
use super::source::ImageReference;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage};
use ndarray::{ArrayD, ArrayView3, Ix3};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A leading axis shorter than this marks a buffer as channel-first.
const CHANNEL_FIRST_THRESHOLD: usize = 5;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("unsupported input type: {0}")]
    UnsupportedInputType(String),
    #[error("unsupported pixel shape {shape:?}: cannot interpret dimension of length {dimension} as channels")]
    UnsupportedPixelShape { dimension: usize, shape: Vec<usize> },
    #[error("primary decoder failed and the fallback decoder is not available: {remediation}")]
    MissingOptionalDependency { remediation: &'static str },
    #[error("could not decode {source_name}: {primary}; fallback decoder: {fallback}")]
    DecodeFailure {
        source_name: String,
        primary: image::ImageError,
        fallback: Box<ReadError>,
    },
    #[error("fallback decoder error: {0}")]
    Fallback(String),
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decode any image reference to canonical RGB.
///
/// Orientation correction, when requested, applies to path and URL sources
/// only; those are the ones that carry EXIF metadata.
pub fn read(source: &ImageReference, options: &ReadOptions) -> Result<CanonicalImage, ReadError> {
    log::debug!("reading {source}");
    match source {
        ImageReference::Decoded(img) => Ok(CanonicalImage::from_dynamic(img)),
        ImageReference::PixelBuffer(array) => read_pixel_buffer(array),
        ImageReference::Path(path) => {
            let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
                path: path.clone(),
                source,
            })?;
            read_encoded(&bytes, &path.display().to_string(), options)
        }
        ImageReference::Url(url) => {
            let bytes = fetch::fetch(url, options.fetch_timeout)?;
            read_encoded(&bytes, url, options)
        }
    }
}

/// Convenience wrapper for a local file.
pub fn read_path(path: &Path, options: &ReadOptions) -> Result<CanonicalImage, ReadError> {
    read(&ImageReference::Path(path.to_path_buf()), options)
}

/// Decode an encoded image held in memory, falling back to the secondary
/// decoder when the primary one rejects it.
///
/// `source_name` only labels errors and log lines.
pub fn read_encoded(
    bytes: &[u8],
    source_name: &str,
    options: &ReadOptions,
) -> Result<CanonicalImage, ReadError> {
    let image = match decode_primary(bytes, options.allow_large_images) {
        Ok((img, orientation)) => CanonicalImage::from_dynamic(&img).with_orientation(orientation),
        Err(primary) => {
            log::warn!("primary decoder rejected {source_name} ({primary}), trying fallback decoder");
            match fallback::decode(bytes, options.allow_large_images) {
                Ok(image) => image,
                Err(e @ ReadError::MissingOptionalDependency { .. }) => return Err(e),
                Err(e @ ReadError::UnsupportedPixelShape { .. }) => return Err(e),
                Err(fallback) => {
                    return Err(ReadError::DecodeFailure {
                        source_name: source_name.to_string(),
                        primary,
                        fallback: Box::new(fallback),
                    });
                }
            }
        }
    };

    Ok(if options.correct_orientation {
        orientation::correct(image)
    } else {
        image
    })
}

fn decode_primary(
    bytes: &[u8],
    allow_large_images: bool,
) -> image::ImageResult<(DynamicImage, Orientation)> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if allow_large_images {
        reader.no_limits();
    }
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let img = DynamicImage::from_decoder(decoder)?;
    Ok((img, orientation))
}

/// Raw pixels to RGB.
///
/// A leading axis shorter than [`CHANNEL_FIRST_THRESHOLD`] is read as
/// `C x H x W` and permuted to `H x W x C`; otherwise the buffer is taken to
/// be channel-last already.
fn read_pixel_buffer(array: &ArrayD<u8>) -> Result<CanonicalImage, ReadError> {
    let view = array.view().into_dimensionality::<Ix3>().map_err(|_| {
        ReadError::UnsupportedInputType(format!(
            "pixel buffer must be 3-dimensional, got shape {:?}",
            array.shape()
        ))
    })?;
    let channel_last = if view.shape()[0] < CHANNEL_FIRST_THRESHOLD {
        view.permuted_axes([1, 2, 0])
    } else {
        view
    };
    Ok(CanonicalImage::from_rgb(channel_last_to_rgb(channel_last)?))
}

fn channel_last_to_rgb(view: ArrayView3<'_, u8>) -> Result<RgbImage, ReadError> {
    let (h, w, c) = view.dim();
    let (width, height) = match (u32::try_from(w), u32::try_from(h)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(ReadError::UnsupportedInputType(format!(
                "pixel buffer of {h}x{w} exceeds the supported image size"
            )));
        }
    };
    let pixel = |x: u32, y: u32| -> Rgb<u8> {
        let (y, x) = (y as usize, x as usize);
        match c {
            1 => {
                let v = view[[y, x, 0]];
                Rgb([v, v, v])
            }
            _ => Rgb([view[[y, x, 0]], view[[y, x, 1]], view[[y, x, 2]]]),
        }
    };
    match c {
        1 | 3 | 4 => Ok(RgbImage::from_fn(width, height, pixel)),
        other => Err(ReadError::UnsupportedPixelShape {
            dimension: other,
            shape: vec![h, w, c],
        }),
    }
}
