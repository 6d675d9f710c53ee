//! Keyword word-cloud rendering
//!
//! A cloud is laid out on a 600x400 white canvas, then placed into a 640x480
//! figure with bilinear resampling, no axes, and the title centred above it.
//! The figure is returned as PNG bytes.

pub mod fonts;
pub mod layout;

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use serde::Serialize;
use tracing::debug;

use crate::error::ComparisonError;
use crate::keywords::KeywordFrequencies;
use fonts::{cloud_font, text_extent, FontMetrics};
use layout::{layout_words, PlacedWord};

pub const CLOUD_WIDTH: u32 = 600;
pub const CLOUD_HEIGHT: u32 = 400;

pub const FIGURE_WIDTH: u32 = 640;
pub const FIGURE_HEIGHT: u32 = 480;
/// Plot area inside the figure: left, top, width, height
const AXES_BOX: (u32, u32, u32, u32) = (80, 58, 496, 370);
const TITLE_SIZE: f32 = 22.0;
/// Gap between the title baseline and the top of the plot area
const TITLE_PAD: u32 = 8;

pub const PNG_MIME_TYPE: &str = "image/png";

const EMPTY_CLOUD_MESSAGE: &str = "We need at least 1 word to plot a word cloud, got 0.";

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const TITLE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Viridis samples, darkest first
const PALETTE: [Rgb<u8>; 8] = [
    Rgb([68, 1, 84]),
    Rgb([70, 50, 126]),
    Rgb([54, 92, 141]),
    Rgb([39, 127, 142]),
    Rgb([31, 161, 135]),
    Rgb([74, 193, 109]),
    Rgb([160, 218, 57]),
    Rgb([223, 227, 24]),
];

/// A rendered word-cloud figure
#[derive(Debug, Clone, Serialize)]
pub struct WordCloudImage {
    pub title: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Render `frequencies` as a titled word-cloud figure.
///
/// An empty mapping cannot be plotted and is reported as a rendering error.
pub fn render_wordcloud(
    frequencies: &KeywordFrequencies,
    title: &str,
) -> Result<WordCloudImage, ComparisonError> {
    if frequencies.is_empty() {
        return Err(ComparisonError::Rendering(EMPTY_CLOUD_MESSAGE.into()));
    }

    let font = cloud_font()?;

    let placed = layout_words(frequencies, CLOUD_WIDTH, CLOUD_HEIGHT, &FontMetrics(font));
    debug!(
        "Placed {} of {} words for '{}'",
        placed.len(),
        frequencies.len(),
        title
    );

    let cloud = draw_cloud(font, &placed);
    let figure = compose_figure(font, &cloud, title);

    let mut png = Vec::new();
    figure.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(WordCloudImage {
        title: title.to_string(),
        width: figure.width(),
        height: figure.height(),
        png,
    })
}

fn draw_cloud(font: &Font<'_>, placed: &[PlacedWord]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CLOUD_WIDTH, CLOUD_HEIGHT, WHITE);
    for word in placed {
        let color = PALETTE[word.rank % PALETTE.len()];
        draw_text(
            &mut canvas,
            font,
            &word.word,
            word.font_size as f32,
            word.x as f32,
            word.y as f32,
            color,
        );
    }
    canvas
}

fn compose_figure(font: &Font<'_>, cloud: &RgbImage, title: &str) -> RgbImage {
    let mut figure = RgbImage::from_pixel(FIGURE_WIDTH, FIGURE_HEIGHT, WHITE);

    // Fit the cloud into the plot area, keeping its aspect ratio
    let (left, top, box_w, box_h) = AXES_BOX;
    let scale = (box_w as f32 / cloud.width() as f32).min(box_h as f32 / cloud.height() as f32);
    let scaled_w = (cloud.width() as f32 * scale).round() as u32;
    let scaled_h = (cloud.height() as f32 * scale).round() as u32;
    let resized = imageops::resize(cloud, scaled_w, scaled_h, FilterType::Triangle);

    let image_x = left + (box_w - scaled_w) / 2;
    let image_y = top + (box_h - scaled_h) / 2;
    imageops::replace(&mut figure, &resized, image_x as i64, image_y as i64);

    let (title_w, title_h) = text_extent(font, title, TITLE_SIZE);
    let title_x = (FIGURE_WIDTH.saturating_sub(title_w)) / 2;
    let title_y = image_y.saturating_sub(title_h + TITLE_PAD);
    draw_text(
        &mut figure,
        font,
        title,
        TITLE_SIZE,
        title_x as f32,
        title_y as f32,
        TITLE_COLOR,
    );

    figure
}

/// Draw `text` with its top-left corner at (x, y), alpha-blending glyph
/// coverage over the existing pixels.
fn draw_text(
    canvas: &mut RgbImage,
    font: &Font<'_>,
    text: &str,
    size: f32,
    x: f32,
    y: f32,
    color: Rgb<u8>,
) {
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    let (width, height) = canvas.dimensions();

    for glyph in font.layout(text, scale, point(x, y + ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x + gx as i32;
            let py = bb.min.y + gy as i32;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for channel in 0..3 {
                let under = pixel.0[channel] as f32;
                let over = color.0[channel] as f32;
                pixel.0[channel] = (under + (over - under) * coverage).round() as u8;
            }
        });
    }
}
