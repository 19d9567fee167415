//! Sink module: where finished frames go.
//!
//! A [`PixelSink`] accepts one complete canvas per render tick. Sinks are
//! moved onto the render thread while the loop runs and handed back when it
//! stops.
//!
//! - [`Ssd1306`]: SSD1306 OLED controller on any `embedded-hal` I2C bus
//! - [`TerminalSink`]: half-block preview on a terminal
//! - [`MemorySink`]: records frames in memory
//! - [`DetachedSink`]: stands in when no device could be opened

mod memory;
mod ssd1306;
mod terminal;

pub use memory::MemorySink;
pub use ssd1306::Ssd1306;
pub use terminal::TerminalSink;

use crate::buffer::Canvas;
use crate::error::DeviceError;

/// A display device or transport that accepts full frames.
pub trait PixelSink: Send {
    /// Push a complete frame to the device.
    ///
    /// Implementations may stage and flush internally, but a frame is either
    /// fully sent or the call fails.
    fn present_frame(&mut self, canvas: &Canvas) -> Result<(), DeviceError>;

    /// Short name used in log messages.
    fn name(&self) -> &'static str {
        "sink"
    }
}

impl<S: PixelSink + ?Sized> PixelSink for Box<S> {
    fn present_frame(&mut self, canvas: &Canvas) -> Result<(), DeviceError> {
        (**self).present_frame(canvas)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Placeholder for a device that could not be opened.
///
/// Every frame fails with [`DeviceError::NotConnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSink;

impl PixelSink for DetachedSink {
    fn present_frame(&mut self, _canvas: &Canvas) -> Result<(), DeviceError> {
        Err(DeviceError::NotConnected)
    }

    fn name(&self) -> &'static str {
        "detached"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_sink_always_fails() {
        let mut sink = DetachedSink;
        let canvas = Canvas::new(8, 8);
        for _ in 0..3 {
            assert!(matches!(
                sink.present_frame(&canvas),
                Err(DeviceError::NotConnected)
            ));
        }
    }

    #[test]
    fn test_boxed_sink_delegates() {
        let memory = MemorySink::new();
        let mut boxed: Box<dyn PixelSink> = Box::new(memory.clone());
        boxed.present_frame(&Canvas::new(8, 8)).unwrap();
        assert_eq!(boxed.name(), "memory");
        assert_eq!(memory.frame_count(), 1);
    }
}
