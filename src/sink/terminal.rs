//! `TerminalSink`: previews frames on a terminal.
//!
//! Two pixel rows map to one terminal line using the upper/lower half block
//! characters, so a 128x32 canvas takes 128x16 cells.

use super::PixelSink;
use crate::buffer::Canvas;
use crate::error::DeviceError;
use crossterm::{cursor, queue, style::Print};
use std::io::Write;

/// Sink drawing frames at a fixed position of a terminal.
pub struct TerminalSink<W: Write> {
    out: W,
    origin: (u16, u16),
    /// Reused line buffer.
    line: String,
}

impl<W: Write> TerminalSink<W> {
    /// Draw frames with their top-left corner at column `x`, line `y`.
    pub fn new(out: W, x: u16, y: u16) -> Self {
        Self {
            out,
            origin: (x, y),
            line: String::new(),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Glyph for a vertical pair of pixels.
const fn half_block(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (false, false) => ' ',
        (true, false) => '▀',
        (false, true) => '▄',
        (true, true) => '█',
    }
}

impl<W: Write + Send> PixelSink for TerminalSink<W> {
    fn present_frame(&mut self, canvas: &Canvas) -> Result<(), DeviceError> {
        let (x, y) = self.origin;
        for (line_no, y_px) in (0..canvas.height()).step_by(2).enumerate() {
            let top = canvas.row_pixels(y_px);
            let bottom = (y_px + 1 < canvas.height()).then(|| canvas.row_pixels(y_px + 1));

            self.line.clear();
            for (col, &on) in top.iter().enumerate() {
                let below = bottom.is_some_and(|row| row[col]);
                self.line.push(half_block(on, below));
            }

            let line_no = u16::try_from(line_no).unwrap_or(u16::MAX);
            queue!(
                self.out,
                cursor::MoveTo(x, y.saturating_add(line_no)),
                Print(&self.line)
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
