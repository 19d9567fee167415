//! Canvas: a 1-bit pixel buffer the size of the panel.
//!
//! Pixels are stored row-major, one `bool` per pixel. The canvas is an
//! `embedded-graphics` draw target, so any font or primitive from that
//! ecosystem can draw into it.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size};
use std::convert::Infallible;

/// A monochrome pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: Vec<bool>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Create a blank canvas.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Canvas dimensions must be non-zero");
        Self {
            pixels: vec![false; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Canvas width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Whether the pixel at (x, y) is lit. Out of bounds reads as unlit.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y). Out of bounds writes are clipped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if let Some(i) = self.index_of(x, y) {
            self.pixels[i] = on;
        }
    }

    /// Turn every pixel off.
    #[inline]
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Whether no pixel is lit.
    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Whether any pixel in the horizontal band `y..y + height` is lit.
    pub fn band_has_ink(&self, y: u32, height: u32) -> bool {
        let end = y.saturating_add(height).min(self.height);
        (y..end).any(|row| self.row_pixels(row).iter().any(|&p| p))
    }

    /// Pixels of one line, left to right.
    ///
    /// # Panics
    /// Panics if `y` is out of bounds.
    pub fn row_pixels(&self, y: u32) -> &[bool] {
        let start = (y as usize) * (self.width as usize);
        &self.pixels[start..start + self.width as usize]
    }

    /// Pack the canvas into SSD1306 page layout.
    ///
    /// Each page is 8 pixels tall; each byte is one column of a page with
    /// the least significant bit at the top. Pages are concatenated top to
    /// bottom, `width` bytes each. A trailing partial page is zero-padded.
    pub fn to_pages(&self) -> Vec<u8> {
        let pages = self.height.div_ceil(8);
        let mut out = vec![0u8; (pages as usize) * (self.width as usize)];
        for y in 0..self.height {
            let page_offset = ((y / 8) as usize) * (self.width as usize);
            let bit = 1u8 << (y % 8);
            for (x, &on) in self.row_pixels(y).iter().enumerate() {
                if on {
                    out[page_offset + x] |= bit;
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("lit", &self.lit_count())
            .finish()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set(x, y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color.is_on());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_new_is_blank() {
        let canvas = Canvas::new(128, 32);
        assert_eq!(canvas.width(), 128);
        assert_eq!(canvas.height(), 32);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_canvas_set_get_clip() {
        let mut canvas = Canvas::new(8, 8);
        canvas.set(3, 4, true);
        canvas.set(-1, 0, true);
        canvas.set(8, 0, true);
        canvas.set(0, 100, true);
        assert!(canvas.get(3, 4));
        assert!(!canvas.get(-1, 0));
        assert_eq!(canvas.lit_count(), 1);
    }

    #[test]
    fn test_canvas_clear() {
        let mut canvas = Canvas::new(16, 16);
        canvas.set(1, 1, true);
        canvas.clear();
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_band_has_ink() {
        let mut canvas = Canvas::new(16, 32);
        canvas.set(5, 17, true);
        assert!(!canvas.band_has_ink(0, 8));
        assert!(!canvas.band_has_ink(8, 8));
        assert!(canvas.band_has_ink(16, 8));
        assert!(!canvas.band_has_ink(24, 8));
    }

    #[test]
    fn test_to_pages_bit_order() {
        let mut canvas = Canvas::new(4, 16);
        canvas.set(0, 0, true);
        canvas.set(1, 7, true);
        canvas.set(2, 8, true);
        canvas.set(3, 15, true);

        let pages = canvas.to_pages();
        assert_eq!(pages.len(), 8);
        assert_eq!(&pages[..4], &[0x01, 0x80, 0x00, 0x00]);
        assert_eq!(&pages[4..], &[0x00, 0x00, 0x01, 0x80]);
    }

    #[test]
    fn test_draw_target_pixels() {
        let mut canvas = Canvas::new(4, 4);
        canvas
            .draw_iter([
                Pixel(Point::new(1, 1), BinaryColor::On),
                Pixel(Point::new(9, 9), BinaryColor::On),
            ])
            .unwrap();
        assert!(canvas.get(1, 1));
        assert_eq!(canvas.lit_count(), 1);
    }
}
