//! Text rendering for captions and selector labels.
//!
//! Provides the fixed-width line wrap used for captions and centered,
//! multi-line text boxes drawn with a single font face.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::canvas;
use crate::dimensions::Dimensions;

/// Split `text` into chunks of `max_line_length` characters joined by `\n`.
///
/// This is a hard character-count wrap: a chunk boundary may fall in the
/// middle of a word. A zero line length leaves the text unchanged.
pub fn wrap(text: &str, max_line_length: usize) -> String {
    if max_line_length == 0 {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_line_length)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width<F: Font>(font: &F, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Compute the line height for the given font and scale.
pub fn line_height<F: Font>(font: &F, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil() as u32
}

/// Colours, size and nudge of a text box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub background: Rgba<u8>,
    pub color: Rgba<u8>,
    /// Added to the box midpoint before centering, in pixels.
    pub offset: (i32, i32),
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            background: Rgba([0, 0, 0, 255]),
            color: Rgba([255, 255, 255, 255]),
            offset: (0, 0),
        }
    }
}

impl TextStyle {
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_offset(mut self, offset: (i32, i32)) -> Self {
        self.offset = offset;
        self
    }
}

/// Draws text with one fixed font face.
#[derive(Clone)]
pub struct TextRenderer {
    font: FontArc,
}

impl TextRenderer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Render `text` centered on a solid box of exactly `dimensions`.
    ///
    /// Each `\n`-separated line is centered horizontally and the block of
    /// lines is centered vertically. Text is never wrapped here; use [`wrap`]
    /// first.
    pub fn render_text_box(&self, text: &str, dimensions: Dimensions, style: &TextStyle) -> RgbaImage {
        let mut img = canvas::new_canvas(dimensions, style.background);
        if text.is_empty() {
            return img;
        }

        let scale = PxScale::from(style.font_size);
        let lh = line_height(&self.font, scale) as i32;
        let lines: Vec<&str> = text.split('\n').collect();
        let block_height = lh * lines.len() as i32;

        let center_x = dimensions.width() as i32 / 2 + style.offset.0;
        let mut y = (dimensions.height() as i32 - block_height) / 2 + style.offset.1;
        for line in lines {
            let line_width = measure_text_width(&self.font, scale, line) as i32;
            draw_text_mut(
                &mut img,
                style.color,
                center_x - line_width / 2,
                y,
                scale,
                &self.font,
                line,
            );
            y += lh;
        }
        img
    }
}
