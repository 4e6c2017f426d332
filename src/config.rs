//! Comparison configuration.
//!
//! Every option has a default; a config file only lists what it overrides.
//! The CLI layers its own flags on top of whatever the file resolved to.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! label1 = "1"              # Label over the first image
//! label2 = "2"              # Label over the second image
//! width = 704               # Component width in pixels
//! show_labels = true
//! starting_position = 50    # Slider start, percent from the left (0-100)
//! make_responsive = true
//! in_memory = false         # Encode without touching the filesystem
//!
//! [reader]
//! correct_orientation = false
//! allow_large_images = true # Lift decoder pixel/allocation ceilings
//! fetch_timeout_secs = 0    # 0 = wait indefinitely
//!
//! [encoder]
//! quality = 100             # JPEG quality (1-100)
//! scratch_dir = ""          # "" = private temp dir per render
//!
//! [widget]
//! cdn_base = "https://cdn.knightlab.com/libs/juxtapose/latest"
//! container_id = "image-comparison"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ReadOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a render call needs besides the two images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    pub label1: String,
    pub label2: String,
    /// Component width in pixels; the height follows from the first image.
    pub width: u32,
    pub show_labels: bool,
    /// Initial slider position as a percentage from the left edge.
    pub starting_position: u32,
    pub make_responsive: bool,
    /// Encode without a scratch file.
    pub in_memory: bool,
    pub reader: ReaderConfig,
    pub encoder: EncoderConfig,
    pub widget: WidgetConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            label1: "1".to_string(),
            label2: "2".to_string(),
            width: 704,
            show_labels: true,
            starting_position: 50,
            make_responsive: true,
            in_memory: false,
            reader: ReaderConfig::default(),
            encoder: EncoderConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}

impl ComparisonConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::Validation("width must be positive".into()));
        }
        if self.starting_position > 100 {
            return Err(ConfigError::Validation(format!(
                "starting_position must be 0-100, got {}",
                self.starting_position
            )));
        }
        if self.widget.container_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "widget.container_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Decode-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Apply EXIF orientation to path and URL sources.
    pub correct_orientation: bool,
    /// Lift decoder pixel ceilings for this render.
    pub allow_large_images: bool,
    /// Seconds before a URL fetch gives up; `0` waits indefinitely.
    pub fetch_timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            correct_orientation: false,
            allow_large_images: true,
            fetch_timeout_secs: 0,
        }
    }
}

impl ReaderConfig {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            correct_orientation: self.correct_orientation,
            allow_large_images: self.allow_large_images,
            fetch_timeout: (self.fetch_timeout_secs > 0)
                .then(|| Duration::from_secs(self.fetch_timeout_secs)),
        }
    }
}

/// Encode-side settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub quality: Quality,
    /// Shared scratch directory, cleared of `*.jpg` before every file-backed
    /// render. Empty means a private temp directory per render.
    pub scratch_dir: String,
}

impl EncoderConfig {
    pub fn scratch_dir(&self) -> Option<PathBuf> {
        (!self.scratch_dir.is_empty()).then(|| PathBuf::from(&self.scratch_dir))
    }
}

/// Where the slider widget's assets live and what it mounts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Base URL holding `css/juxtapose.css` and `js/juxtapose.min.js`.
    pub cdn_base: String,
    /// `id` of the container element.
    pub container_id: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.knightlab.com/libs/juxtapose/latest".to_string(),
            container_id: "image-comparison".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ComparisonConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file over the stock defaults and validate the result.
pub fn load_config(path: &Path) -> Result<ComparisonConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    let config: ComparisonConfig = merge_toml(stock_defaults_value(), overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(path: &Path) -> Result<ComparisonConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(ComparisonConfig::default())
    }
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Comparison Configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Labels drawn over each side of the slider.
label1 = "1"
label2 = "2"

# Component width in pixels. The height is derived from the first image:
#   height = floor(width * image_height / image_width * 0.95)
width = 704

# Show the labels on the images.
show_labels = true

# Where the slider starts, as a percentage from the left edge (0-100).
starting_position = 50

# Let the widget resize with its container.
make_responsive = true

# Encode images in memory instead of via a scratch file on disk.
in_memory = false

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[reader]
# Rotate/mirror path and URL sources according to their EXIF orientation.
correct_orientation = false

# Lift the decoders' pixel and allocation ceilings. Comparison images are
# often large; this only affects the current render.
allow_large_images = true

# Seconds to wait for a URL fetch. 0 waits indefinitely.
fetch_timeout_secs = 0

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoder]
# JPEG quality (1-100).
quality = 100

# Shared scratch directory for file-backed encoding. Every *.jpg inside it is
# deleted at the start of each render. Leave empty to use a private temporary
# directory that is removed when the render finishes.
scratch_dir = ""

# ---------------------------------------------------------------------------
# Slider widget
# ---------------------------------------------------------------------------
[widget]
# Base URL serving css/juxtapose.css and js/juxtapose.min.js.
cdn_base = "https://cdn.knightlab.com/libs/juxtapose/latest"

# id of the element the slider mounts on.
container_id = "image-comparison"
"##
}
