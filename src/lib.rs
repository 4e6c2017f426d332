//! # Image Comparison
//!
//! Side-by-side, draggable-slider comparisons of two images, delivered as an
//! embeddable HTML fragment. Images can come from a local path, an HTTP(S)
//! URL, a raw pixel buffer or an already-decoded image.
//!
//! # Architecture: Read → Encode → Render
//!
//! ```text
//! ImageReference ──► reader ──► CanonicalImage ──► encoder ──► EncodedPayload
//!   (path, url,       │  fallback decoder            │  in memory, or
//!    pixels, image)   │  orientation fix             │  via scratch file
//!                     ▼                              ▼
//!               DisplayGeometry ───────────────► render ──► fragment + height/width
//! ```
//!
//! The hard part is the ingestion pipeline: four unrelated source shapes, a
//! primary decoder that gives up on large or exotic TIFFs, EXIF orientation,
//! and two interchangeable encode paths. The renderer on top is a thin
//! orchestration step.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Source reader, fallback decoder, orientation corrector, encoder, geometry |
//! | [`render`] | Comparison renderer — reads, encodes and emits the slider fragment via Maud |
//! | [`config`] | `ComparisonConfig` defaults, TOML loading and validation |
//!
//! # Design Decisions
//!
//! ## Per-call decoder ceilings
//!
//! Comparison images are expected to be large, so decoder pixel ceilings are
//! lifted by default. The switch is [`imaging::ReadOptions::allow_large_images`],
//! passed to every read; nothing is flipped process-wide, so unrelated decodes
//! in the same process keep their limits.
//!
//! ## Scoped scratch directories
//!
//! File-backed encoding writes into a fresh temporary directory owned by the
//! render call and removed when it returns. Concurrent renders never share
//! files. A shared, clear-before-write directory is still available through
//! `encoder.scratch_dir` for hosts that want the artifacts in a known place.
//!
//! ## Narrow fallback trigger
//!
//! The fallback decoder only runs when the primary decoder rejects bytes it
//! was given. File-system and network errors surface directly instead of being
//! reported as a decoder problem.

pub mod config;
pub mod imaging;
pub mod render;

pub use config::ComparisonConfig;
pub use imaging::ImageReference;
pub use render::{RenderError, RenderedComparison, render};

#[cfg(test)]
pub(crate) mod test_helpers;
