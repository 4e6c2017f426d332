//! Shared test utilities: synthetic images in the encodings the reader accepts.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("before.jpg");
//! create_test_jpeg(&path, 1000, 500);
//!
//! let rotated = jpeg_with_orientation(40, 20, 6);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Pixel data
// =========================================================================

/// Smooth RGB gradient; survives JPEG at quality 100 almost unchanged.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

// =========================================================================
// Encoded files
// =========================================================================

pub fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(&gradient(width, height))).unwrap();
}

pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn encode_tiff(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Tiff).unwrap();
    buf.into_inner()
}

/// A gradient JPEG carrying an EXIF APP1 segment with the given orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, tag: u16) -> Vec<u8> {
    let jpeg = encode_jpeg(&gradient(width, height));

    // Little-endian TIFF header, one IFD entry: 0x0112 SHORT x1 = tag.
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00\x08\x00\x00\x00");
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&(tag as u32).to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut app1 = b"Exif\x00\x00".to_vec();
    app1.extend_from_slice(&tiff);
    let segment_len = (app1.len() + 2) as u16;

    // SOI, APP1, then the rest of the encoder output.
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// TIFF layouts for the fallback decoder
// =========================================================================

/// Encode raw interleaved samples as a TIFF of colour type `C`.
#[cfg(feature = "tiff-fallback")]
pub fn encode_tiff_samples<C>(width: u32, height: u32, samples: &[C::Inner]) -> Vec<u8>
where
    C: tiff::encoder::colortype::ColorType,
    [C::Inner]: tiff::encoder::TiffValue,
{
    let mut buf = Cursor::new(Vec::new());
    tiff::encoder::TiffEncoder::new(&mut buf)
        .unwrap()
        .write_image::<C>(width, height, samples)
        .unwrap();
    buf.into_inner()
}

/// An uncompressed single-strip 1-bit TIFF.
///
/// `packed` holds the rows MSB first, each padded to a whole byte.
#[cfg(feature = "tiff-fallback")]
pub fn bilevel_tiff(width: u16, height: u16, packed: &[u8], white_is_zero: bool) -> Vec<u8> {
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    let entries: [(u16, u16, u32); 9] = [
        (256, SHORT, width.into()),
        (257, SHORT, height.into()),
        (258, SHORT, 1),
        (259, SHORT, 1),
        (262, SHORT, if white_is_zero { 0 } else { 1 }),
        (273, LONG, 0), // patched below
        (277, SHORT, 1),
        (278, SHORT, height.into()),
        (279, LONG, packed.len() as u32),
    ];
    let data_offset = 8 + 2 + entries.len() as u32 * 12 + 4;

    let mut out = b"II\x2a\x00\x08\x00\x00\x00".to_vec();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, kind, value) in entries {
        let value = if tag == 273 { data_offset } else { value };
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(packed);
    out
}
