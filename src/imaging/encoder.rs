//! Encoder: [`CanonicalImage`] → self-describing `data:` URI.
//!
//! Both encode paths produce the same JPEG bytes (quality 100 by default,
//! 4:4:4 chroma — the `image` crate's encoder never subsamples), so an
//! [`EncodedPayload`] built in memory is byte-identical to one that went
//! through a [`ScratchArea`] file.
//!
//! ## Scratch areas
//!
//! | Constructor | Lifetime | Cleanup |
//! |---|---|---|
//! | [`ScratchArea::scoped`] | one render call | directory removed on drop |
//! | [`ScratchArea::shared`] | caller-managed directory | every `*.jpg` deleted when opened |

use super::canonical::CanonicalImage;
use super::params::Quality;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ExtendedColorType;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

/// MIME prefix of every payload.
pub const DATA_URI_PREFIX: &str = "data:image/jpg;base64,";

/// Extension of scratch artifacts.
pub const ARTIFACT_EXTENSION: &str = "jpg";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JPEG encode failed: {0}")]
    Jpeg(#[from] image::ImageError),
    #[error("scratch file error: {0}")]
    Io(#[from] io::Error),
}

/// A `data:image/jpg;base64,...` string ready to drop into a `src` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Wrap already-encoded JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base64 body after the MIME prefix.
    pub fn body(&self) -> &str {
        &self.0[DATA_URI_PREFIX.len()..]
    }

    /// Decode the body back to the JPEG bytes it was built from.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.body())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the encoder stages its bytes.
#[derive(Debug, Clone, Copy)]
pub enum EncodeMode<'a> {
    /// Never touches the filesystem.
    InMemory,
    /// Write to a uniquely named file, then read it back.
    Scratch(&'a ScratchArea),
}

/// Working directory for file-backed encodes.
#[derive(Debug)]
pub enum ScratchArea {
    Scoped(TempDir),
    Shared(PathBuf),
}

impl ScratchArea {
    /// Fresh private directory, removed when this value is dropped.
    pub fn scoped() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("image-comparison-")
            .tempdir()?;
        log::debug!("scratch area {}", dir.path().display());
        Ok(Self::Scoped(dir))
    }

    /// Long-lived directory shared between calls.
    ///
    /// Created if missing; every existing artifact is deleted up front. Two
    /// concurrent callers on the same directory can delete each other's
    /// files, which is why [`scoped`](Self::scoped) is the default.
    pub fn shared(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let removed = clear_artifacts(&dir)?;
        if removed > 0 {
            log::debug!("cleared {removed} stale artifacts from {}", dir.display());
        }
        Ok(Self::Shared(dir))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Scoped(dir) => dir.path(),
            Self::Shared(dir) => dir,
        }
    }

    /// Write `bytes` to `<random uuid>.jpg` inside the area.
    fn write_artifact(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self
            .path()
            .join(format!("{}.{ARTIFACT_EXTENSION}", uuid::Uuid::new_v4()));
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Delete every file with the artifact extension directly inside `dir`.
fn clear_artifacts(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_artifact = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == ARTIFACT_EXTENSION);
        if is_artifact {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Serialize `image` as a JPEG data URI.
pub fn encode(
    image: &CanonicalImage,
    mode: EncodeMode<'_>,
    quality: Quality,
) -> Result<EncodedPayload, EncodeError> {
    let jpeg = encode_jpeg(image, quality)?;
    match mode {
        EncodeMode::InMemory => Ok(EncodedPayload::from_jpeg_bytes(&jpeg)),
        EncodeMode::Scratch(area) => {
            let path = area.write_artifact(&jpeg)?;
            log::debug!("wrote {} bytes to {}", jpeg.len(), path.display());
            Ok(encode_file(&path)?)
        }
    }
}

/// Wrap a file's bytes, as stored, in a JPEG data URI.
///
/// No decoding happens: the MIME tag is always `image/jpg`.
pub fn encode_file(path: &Path) -> io::Result<EncodedPayload> {
    let bytes = fs::read(path)?;
    Ok(EncodedPayload::from_jpeg_bytes(&bytes))
}

fn encode_jpeg(image: &CanonicalImage, quality: Quality) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let pixels = image.pixels();
    JpegEncoder::new_with_quality(&mut buf, quality.value()).write_image(
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
