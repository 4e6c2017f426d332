//! Fallback decoding for inputs the primary `image` decoders reject.
//!
//! The fallback reads the first page of a TIFF (including BigTIFF and
//! multi-page files) straight through the `tiff` crate, builds an ndarray
//! from the samples, and classifies it by shape:
//!
//! | Shape | Treated as | Conversion |
//! |---|---|---|
//! | `H x W` | bilevel | non-zero → white, zero → black |
//! | `H x W x 3` | RGB | none |
//! | `H x W x 4` | RGBA | alpha dropped |
//! | anything else | — | [`ReadError::UnsupportedPixelShape`] |
//!
//! Two TIFF layouts are reshaped before classification: packed 1-bit pages
//! are expanded to one byte per pixel (`H x W`), and CMYK pages are converted
//! to RGB (`H x W x 3`).
//!
//! The TIFF decoder is behind the `tiff-fallback` cargo feature. Without it,
//! [`decode`] reports [`ReadError::MissingOptionalDependency`].

use super::reader::ReadError;
use image::{Rgb, RgbImage};
use ndarray::{ArrayViewD, Ix2, Ix3};

/// Remediation shown when the fallback decoder was compiled out.
pub const REMEDIATION: &str =
    "rebuild image-comparison with `--features tiff-fallback` (adds the `tiff` crate)";

/// Whether this build carries the fallback decoder.
pub fn is_available() -> bool {
    cfg!(feature = "tiff-fallback")
}

/// Convert a fallback-decoded sample array to RGB by its shape.
pub fn classify(array: ArrayViewD<'_, u8>) -> Result<RgbImage, ReadError> {
    let shape = array.shape().to_vec();
    match shape.as_slice() {
        [h, w] => {
            let (width, height) = dims(*w, *h)?;
            let plane = array.into_dimensionality::<Ix2>().map_err(shape_error)?;
            log::debug!("fallback array classified as bilevel");
            Ok(RgbImage::from_fn(width, height, |x, y| {
                let v = if plane[[y as usize, x as usize]] > 0 { 255 } else { 0 };
                Rgb([v, v, v])
            }))
        }
        [h, w, c @ (3 | 4)] => {
            let (width, height) = dims(*w, *h)?;
            log::debug!(
                "fallback array classified as {}",
                if *c == 4 { "RGBA" } else { "RGB" }
            );
            let cube = array.into_dimensionality::<Ix3>().map_err(shape_error)?;
            Ok(RgbImage::from_fn(width, height, |x, y| {
                let (y, x) = (y as usize, x as usize);
                Rgb([cube[[y, x, 0]], cube[[y, x, 1]], cube[[y, x, 2]]])
            }))
        }
        [.., last] => Err(ReadError::UnsupportedPixelShape {
            dimension: *last,
            shape: shape.clone(),
        }),
        [] => Err(ReadError::UnsupportedPixelShape {
            dimension: 0,
            shape: Vec::new(),
        }),
    }
}

fn shape_error(e: ndarray::ShapeError) -> ReadError {
    ReadError::Fallback(e.to_string())
}

fn dims(w: usize, h: usize) -> Result<(u32, u32), ReadError> {
    match (u32::try_from(w), u32::try_from(h)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ReadError::UnsupportedPixelShape {
            dimension: w.max(h),
            shape: vec![h, w],
        }),
    }
}

/// Decode `bytes` with the fallback decoder.
#[cfg(feature = "tiff-fallback")]
pub fn decode(
    bytes: &[u8],
    allow_large_images: bool,
) -> Result<super::CanonicalImage, ReadError> {
    tiff_backend::decode(bytes, allow_large_images)
}

/// Decode `bytes` with the fallback decoder.
#[cfg(not(feature = "tiff-fallback"))]
pub fn decode(
    _bytes: &[u8],
    _allow_large_images: bool,
) -> Result<super::CanonicalImage, ReadError> {
    Err(ReadError::MissingOptionalDependency {
        remediation: REMEDIATION,
    })
}

#[cfg(feature = "tiff-fallback")]
mod tiff_backend {
    use super::super::CanonicalImage;
    use super::{ReadError, classify};
    use image::metadata::Orientation;
    use ndarray::{ArrayD, IxDyn};
    use std::io::Cursor;
    use tiff::ColorType;
    use tiff::decoder::ifd::Value;
    use tiff::decoder::{Decoder, DecodingResult, Limits};
    use tiff::tags::Tag;

    const EXIF_ORIENTATION_TAG: u16 = 274;
    const COMPRESSION_NONE: u16 = 1;
    const PHOTOMETRIC_WHITE_IS_ZERO: u16 = 0;
    const FILL_ORDER_LSB_FIRST: u16 = 2;

    /// How the samples of the first page are laid out.
    enum Layout {
        /// One packed bit per pixel.
        Bilevel,
        /// One sample per pixel, or `n` interleaved samples.
        Interleaved(Option<usize>),
        /// Ink samples; converted to RGB before classification.
        Cmyk,
    }

    pub(super) fn decode(
        bytes: &[u8],
        allow_large_images: bool,
    ) -> Result<CanonicalImage, ReadError> {
        let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(failure)?;
        if allow_large_images {
            decoder = decoder.with_limits(Limits::unlimited());
        }

        let (width, height) = decoder.dimensions().map_err(failure)?;
        let layout = match decoder.colortype().map_err(failure)? {
            ColorType::Gray(1) => Layout::Bilevel,
            ColorType::Gray(_) => Layout::Interleaved(None),
            ColorType::GrayA(_) => Layout::Interleaved(Some(2)),
            ColorType::RGB(_) => Layout::Interleaved(Some(3)),
            ColorType::RGBA(_) => Layout::Interleaved(Some(4)),
            ColorType::CMYK(_) => Layout::Cmyk,
            other => {
                return Err(ReadError::Fallback(format!(
                    "unsupported TIFF color type {other:?}"
                )));
            }
        };
        let orientation = decoder
            .find_tag(Tag::from_u16_exhaustive(EXIF_ORIENTATION_TAG))
            .ok()
            .flatten()
            .and_then(|value| value.into_u16().ok())
            .and_then(|tag| u8::try_from(tag).ok())
            .and_then(Orientation::from_exif)
            .unwrap_or(Orientation::NoTransforms);

        let (samples, channels) = match layout {
            Layout::Bilevel => (
                read_bilevel(&mut decoder, bytes, width, height, allow_large_images)?,
                None,
            ),
            Layout::Interleaved(channels) => (
                to_u8_samples(decoder.read_image().map_err(failure)?)?,
                channels,
            ),
            Layout::Cmyk => (
                cmyk_to_rgb(&to_u8_samples(decoder.read_image().map_err(failure)?)?),
                Some(3),
            ),
        };

        let mut shape = vec![height as usize, width as usize];
        shape.extend(channels);
        let array = ArrayD::from_shape_vec(IxDyn(&shape), samples).map_err(|e| {
            ReadError::Fallback(format!("sample count does not match {shape:?}: {e}"))
        })?;

        let pixels = classify(array.view())?;
        Ok(CanonicalImage::from_rgb(pixels).with_orientation(orientation))
    }

    /// Read uncompressed 1-bit strips straight from the file and expand
    /// them to one byte per pixel: 1 for white, 0 for black.
    ///
    /// The `tiff` decoder sizes its output at one byte per sample, so it
    /// cannot return packed bilevel rows itself.
    fn read_bilevel(
        decoder: &mut Decoder<Cursor<&[u8]>>,
        bytes: &[u8],
        width: u32,
        height: u32,
        allow_large_images: bool,
    ) -> Result<Vec<u8>, ReadError> {
        let compression = decoder
            .find_tag_unsigned::<u16>(Tag::Compression)
            .map_err(failure)?
            .unwrap_or(COMPRESSION_NONE);
        if compression != COMPRESSION_NONE {
            return Err(ReadError::Fallback(format!(
                "bilevel TIFF with compression {compression} is not supported"
            )));
        }
        if decoder.find_tag(Tag::TileWidth).map_err(failure)?.is_some() {
            return Err(ReadError::Fallback(
                "tiled bilevel TIFF is not supported".to_string(),
            ));
        }
        let white_is_zero = decoder
            .find_tag_unsigned::<u16>(Tag::PhotometricInterpretation)
            .map_err(failure)?
            == Some(PHOTOMETRIC_WHITE_IS_ZERO);
        let lsb_first = decoder
            .find_tag_unsigned::<u16>(Tag::FillOrder)
            .map_err(failure)?
            == Some(FILL_ORDER_LSB_FIRST);

        let (width, height) = (width as usize, height as usize);
        let pixel_count = width.checked_mul(height).ok_or_else(too_large)?;
        if !allow_large_images && pixel_count > Limits::default().decoding_buffer_size {
            return Err(too_large());
        }

        let row_bytes = width.div_ceil(8);
        let needed = row_bytes * height;
        let offsets = unsigned_list(decoder, Tag::StripOffsets)?;
        let counts = unsigned_list(decoder, Tag::StripByteCounts)?;
        let mut packed = Vec::with_capacity(needed);
        for (&offset, &count) in offsets.iter().zip(&counts) {
            let strip = usize::try_from(offset)
                .ok()
                .zip(usize::try_from(count).ok())
                .and_then(|(start, len)| bytes.get(start..start.checked_add(len)?))
                .ok_or_else(|| {
                    ReadError::Fallback(format!(
                        "strip at {offset} (+{count} bytes) lies outside the file"
                    ))
                })?;
            packed.extend_from_slice(strip);
        }
        if packed.len() < needed {
            return Err(ReadError::Fallback(format!(
                "bilevel strips hold {} bytes, {needed} needed",
                packed.len()
            )));
        }

        Ok(unpack_bits(&packed[..needed], width, lsb_first, white_is_zero))
    }

    /// Expand packed rows (each padded to a whole byte) to one byte per pixel.
    pub(super) fn unpack_bits(
        packed: &[u8],
        width: usize,
        lsb_first: bool,
        white_is_zero: bool,
    ) -> Vec<u8> {
        let row_bytes = width.div_ceil(8);
        let mut out = Vec::with_capacity(packed.len() * 8);
        for row in packed.chunks_exact(row_bytes.max(1)) {
            for x in 0..width {
                let shift = if lsb_first { x % 8 } else { 7 - x % 8 };
                let bit = (row[x / 8] >> shift) & 1;
                out.push(if white_is_zero { bit ^ 1 } else { bit });
            }
        }
        out
    }

    /// Interleaved CMYK samples to interleaved RGB.
    fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
        let ink = |v: u8, k: u8| ((255 - u16::from(v)) * (255 - u16::from(k)) / 255) as u8;
        samples
            .chunks_exact(4)
            .flat_map(|p| [ink(p[0], p[3]), ink(p[1], p[3]), ink(p[2], p[3])])
            .collect()
    }

    fn unsigned_list(
        decoder: &mut Decoder<Cursor<&[u8]>>,
        tag: Tag,
    ) -> Result<Vec<u64>, ReadError> {
        let value = decoder
            .find_tag(tag)
            .map_err(failure)?
            .ok_or_else(|| ReadError::Fallback(format!("missing {tag:?} tag")))?;
        match value {
            Value::List(values) => values
                .into_iter()
                .map(Value::into_u64)
                .collect::<Result<_, _>>()
                .map_err(failure),
            single => single.into_u64().map(|v| vec![v]).map_err(failure),
        }
    }

    /// Scale any sample depth down to 8 bits.
    fn to_u8_samples(result: DecodingResult) -> Result<Vec<u8>, ReadError> {
        Ok(match result {
            DecodingResult::U8(v) => v,
            DecodingResult::U16(v) => v.into_iter().map(|s| (s >> 8) as u8).collect(),
            DecodingResult::U32(v) => v.into_iter().map(|s| (s >> 24) as u8).collect(),
            DecodingResult::U64(v) => v.into_iter().map(|s| (s >> 56) as u8).collect(),
            DecodingResult::F32(v) => v.into_iter().map(|s| unit_to_u8(s as f64)).collect(),
            DecodingResult::F64(v) => v.into_iter().map(unit_to_u8).collect(),
            other => {
                return Err(ReadError::Fallback(format!(
                    "unsupported TIFF sample format {}",
                    sample_format_name(&other)
                )));
            }
        })
    }

    fn unit_to_u8(s: f64) -> u8 {
        (s.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn sample_format_name(result: &DecodingResult) -> &'static str {
        match result {
            DecodingResult::I8(_) => "i8",
            DecodingResult::I16(_) => "i16",
            DecodingResult::I32(_) => "i32",
            DecodingResult::I64(_) => "i64",
            _ => "unknown",
        }
    }

    fn too_large() -> ReadError {
        ReadError::Fallback(tiff::TiffError::LimitsExceeded.to_string())
    }

    fn failure(e: tiff::TiffError) -> ReadError {
        ReadError::Fallback(e.to_string())
    }
}
