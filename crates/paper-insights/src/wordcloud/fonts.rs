//! Font loading for word-cloud rendering
//!
//! Glyphs come from the fonts embedded by `typst-assets`, parsed once and
//! shared for the lifetime of the process.

use std::sync::OnceLock;

use rusttype::{point, Font, Scale};

use super::layout::WordMetrics;
use crate::error::ComparisonError;

/// Global font singleton
static CLOUD_FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();

/// The font used for cloud words and titles
pub fn cloud_font() -> Result<&'static Font<'static>, ComparisonError> {
    CLOUD_FONT
        .get_or_init(load_embedded_font)
        .as_ref()
        .ok_or_else(|| ComparisonError::Rendering("No usable font is embedded".into()))
}

fn load_embedded_font() -> Option<Font<'static>> {
    let font = typst_assets::fonts().find_map(Font::try_from_bytes);
    if font.is_some() {
        tracing::debug!("Word-cloud font loaded from embedded assets");
    } else {
        tracing::warn!("No embedded font could be parsed");
    }
    font
}

/// Pixel width and height of `text` set at `size` pixels
pub fn text_extent(font: &Font<'_>, text: &str, size: f32) -> (u32, u32) {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);

    let width = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0);
    let height = v_metrics.ascent - v_metrics.descent;

    (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32)
}

/// Placement metrics backed by a rasterised font
pub struct FontMetrics<'a>(pub &'a Font<'a>);

impl WordMetrics for FontMetrics<'_> {
    fn extent(&self, word: &str, size: u32) -> (u32, u32) {
        text_extent(self.0, word, size as f32)
    }

    fn ink(&self, word: &str, size: u32) -> Vec<(u32, u32)> {
        let scale = Scale::uniform(size as f32);
        let ascent = self.0.v_metrics(scale).ascent;

        let mut pixels = Vec::new();
        for glyph in self.0.layout(word, scale, point(0.0, ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if coverage > 0.0 && px >= 0 && py >= 0 {
                    pixels.push((px as u32, py as u32));
                }
            });
        }
        pixels
    }
}
