//! Render module: turns a committed snapshot into pixels.
//!
//! Glyph drawing is delegated to a [`TextRasterizer`]. The default
//! [`MonoFontRasterizer`] uses the `embedded-graphics` ASCII fonts; tests and
//! hosts with their own font pipeline can pass any closure instead.

use crate::buffer::Canvas;
use crate::config::DisplayConfig;
use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{Drawable, Point};
use embedded_graphics::text::{Baseline, Text};

/// Draws a line of text into a canvas with its top-left corner at `origin`.
pub trait TextRasterizer: Send {
    /// Draw `text`. Pixels outside the canvas are clipped.
    fn draw_text(&mut self, canvas: &mut Canvas, text: &str, origin: Point);

    /// Horizontal advance of one character in pixels, if fixed.
    fn glyph_width(&self) -> Option<u32> {
        None
    }
}

impl<F> TextRasterizer for F
where
    F: FnMut(&mut Canvas, &str, Point) + Send,
{
    fn draw_text(&mut self, canvas: &mut Canvas, text: &str, origin: Point) {
        self(canvas, text, origin);
    }
}

/// Fonts available to [`MonoFontRasterizer`], shortest first.
const FONTS: [&MonoFont<'static>; 8] = [
    &ascii::FONT_4X6,
    &ascii::FONT_5X7,
    &ascii::FONT_5X8,
    &ascii::FONT_6X10,
    &ascii::FONT_6X12,
    &ascii::FONT_7X14,
    &ascii::FONT_9X15,
    &ascii::FONT_10X20,
];

/// Rasterizer backed by a fixed-size `embedded-graphics` monospace font.
#[derive(Clone, Copy)]
pub struct MonoFontRasterizer {
    font: &'static MonoFont<'static>,
}

impl MonoFontRasterizer {
    /// Use a specific font.
    pub const fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    /// Pick the tallest font whose glyphs fit in `glyph_height` pixels.
    ///
    /// Falls back to the smallest font when none fits.
    pub fn for_glyph_height(glyph_height: u32) -> Self {
        let font = FONTS
            .iter()
            .rev()
            .find(|font| font.character_size.height <= glyph_height)
            .copied()
            .unwrap_or(FONTS[0]);
        Self { font }
    }

    /// Glyph cell size in pixels as (width, height).
    pub const fn glyph_size(&self) -> (u32, u32) {
        (self.font.character_size.width, self.font.character_size.height)
    }
}

impl std::fmt::Debug for MonoFontRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.glyph_size();
        write!(f, "MonoFontRasterizer({width}x{height})")
    }
}

impl TextRasterizer for MonoFontRasterizer {
    fn draw_text(&mut self, canvas: &mut Canvas, text: &str, origin: Point) {
        if text.is_empty() {
            return;
        }
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        // Drawing into a canvas cannot fail.
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(canvas);
    }

    fn glyph_width(&self) -> Option<u32> {
        Some(self.font.character_size.width + self.font.character_spacing)
    }
}

/// Rebuild `canvas` from scratch: clear it, then draw every row at
/// `(0, row * font_size + y_offset)`.
pub fn compose_frame(
    canvas: &mut Canvas,
    rows: &[String],
    config: &DisplayConfig,
    rasterizer: &mut dyn TextRasterizer,
) {
    canvas.clear();
    for (row, text) in rows.iter().enumerate() {
        rasterizer.draw_text(canvas, text, Point::new(0, config.row_y(row)));
    }
}
