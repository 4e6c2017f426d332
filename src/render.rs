//! Comparison rendering.
//!
//! Reads both images, derives the display height from the first one, encodes
//! both as JPEG data URIs and emits an HTML fragment that mounts a
//! [juxtapose](https://juxtapose.knightlab.com/) slider on them.
//!
//! ## Fragment layout
//!
//! ```text
//! <style>                 body margin reset for iframe hosts
//! <link rel=stylesheet>   {cdn}/css/juxtapose.css
//! <script src>            {cdn}/js/juxtapose.min.js
//! <div id=…>              container, sized to the declared height/width
//! <script>                new juxtapose.JXSlider(…)
//! ```
//!
//! The caller hosts the fragment in a surface declaring the same
//! [`RenderedComparison::height`] and [`RenderedComparison::width`].
//!
//! Failures are never retried or partially recovered: either both images are
//! read and encoded, or the call returns the first error.

use crate::config::{ComparisonConfig, ConfigError};
use crate::imaging::{
    self, DisplayGeometry, EncodeError, EncodeMode, EncodedPayload, ImageReference, ReadError,
    ScratchArea,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid comparison settings: {0}")]
    Config(#[from] ConfigError),
    #[error("reading image {index} ({source_name}) failed: {source}")]
    Read {
        index: u8,
        source_name: String,
        #[source]
        source: ReadError,
    },
    #[error("encoding image {index} failed: {source}")]
    Encode {
        index: u8,
        #[source]
        source: EncodeError,
    },
    #[error("encoding failed: could not prepare scratch area: {0}")]
    Scratch(#[source] std::io::Error),
}

/// A rendered slider and the size its host must declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedComparison {
    pub fragment: String,
    pub height: u32,
    pub width: u32,
}

impl RenderedComparison {
    /// Wrap the fragment in a complete HTML document.
    pub fn standalone_page(&self, title: &str) -> String {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (title) }
                }
                body {
                    (PreEscaped(&self.fragment))
                }
            }
        }
        .into_string()
    }
}

/// Render a comparison of `img1` (left) and `img2` (right).
pub fn render(
    img1: &ImageReference,
    img2: &ImageReference,
    config: &ComparisonConfig,
) -> Result<RenderedComparison, RenderError> {
    config.validate()?;

    let read_options = config.reader.read_options();
    let read = |index: u8, source: &ImageReference| {
        imaging::read(source, &read_options).map_err(|e| RenderError::Read {
            index,
            source_name: source.describe(),
            source: e,
        })
    };
    let first = read(1, img1)?;
    let second = read(2, img2)?;

    let geometry = DisplayGeometry::from_source(first.dimensions(), config.width);

    // Held until both encodes finish; a scoped area is deleted on drop.
    let scratch = if config.in_memory {
        None
    } else {
        let area = match config.encoder.scratch_dir() {
            Some(dir) => ScratchArea::shared(dir),
            None => ScratchArea::scoped(),
        };
        Some(area.map_err(RenderError::Scratch)?)
    };
    let mode = match &scratch {
        Some(area) => EncodeMode::Scratch(area),
        None => EncodeMode::InMemory,
    };
    let encode = |index: u8, image: &imaging::CanonicalImage| {
        imaging::encode(image, mode, config.encoder.quality)
            .map_err(|source| RenderError::Encode { index, source })
    };
    let payload1 = encode(1, &first)?;
    let payload2 = encode(2, &second)?;

    log::info!(
        "rendered comparison {}x{} ({} encoding)",
        geometry.width,
        geometry.height,
        if config.in_memory { "in-memory" } else { "file-backed" }
    );

    Ok(RenderedComparison {
        fragment: comparison_fragment(&payload1, &payload2, geometry, config).into_string(),
        height: geometry.height,
        width: geometry.width,
    })
}

fn comparison_fragment(
    payload1: &EncodedPayload,
    payload2: &EncodedPayload,
    geometry: DisplayGeometry,
    config: &ComparisonConfig,
) -> Markup {
    let cdn = config.widget.cdn_base.trim_end_matches('/');
    let container_style = format!(
        "height: {}px; width: {}px;",
        geometry.height, geometry.width
    );

    html! {
        style { "body { margin: unset; }" }
        link rel="stylesheet" href={ (cdn) "/css/juxtapose.css" };
        script src={ (cdn) "/js/juxtapose.min.js" } {}
        div id=(config.widget.container_id) style=(container_style) {}
        script { (PreEscaped(init_script(payload1, payload2, config))) }
    }
}

fn init_script(
    payload1: &EncodedPayload,
    payload2: &EncodedPayload,
    config: &ComparisonConfig,
) -> String {
    format!(
        r#"
new juxtapose.JXSlider({selector},
    [
        {{
            src: {src1},
            label: {label1},
        }},
        {{
            src: {src2},
            label: {label2},
        }}
    ],
    {{
        animate: true,
        showLabels: {show_labels},
        showCredits: true,
        startingPosition: "{position}%",
        makeResponsive: {responsive},
    }});
"#,
        selector = js_string(&format!("#{}", config.widget.container_id)),
        src1 = js_string(payload1.as_str()),
        label1 = js_string(&config.label1),
        src2 = js_string(payload2.as_str()),
        label2 = js_string(&config.label2),
        show_labels = config.show_labels,
        position = config.starting_position,
        responsive = config.make_responsive,
    )
}

/// JSON string literal that is also safe inside a `<script>` element.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace("</", "<\\/")
}

// ============================================================================
// Tests
// ============================================================================
