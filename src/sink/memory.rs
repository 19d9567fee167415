//! `MemorySink`: keeps presented frames in memory.
//!
//! Clones share state, so a host (or a test) can keep one clone while the
//! other is moved onto the render thread.

use super::PixelSink;
use crate::buffer::Canvas;
use crate::error::DeviceError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Shared {
    frames: Mutex<Vec<Canvas>>,
    attempts: AtomicU64,
    failing: AtomicBool,
    /// Keep at most this many frames; 0 keeps all.
    capacity: usize,
}

/// Sink that records every successfully presented frame.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    shared: Arc<Shared>,
}

impl MemorySink {
    /// Record every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity,
                ..Shared::default()
            }),
        }
    }

    /// A sink that rejects every frame until [`set_failing`](Self::set_failing)
    /// is turned off.
    pub fn failing() -> Self {
        let sink = Self::new();
        sink.set_failing(true);
        sink
    }

    /// Make subsequent frames fail with a bus error.
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of `present_frame` calls, successful or not.
    pub fn attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::Relaxed)
    }

    /// Number of frames currently recorded.
    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    /// The most recent recorded frame.
    pub fn last_frame(&self) -> Option<Canvas> {
        self.frames().last().cloned()
    }

    /// Copy of all recorded frames, oldest first.
    pub fn recorded(&self) -> Vec<Canvas> {
        self.frames().clone()
    }

    fn frames(&self) -> MutexGuard<'_, Vec<Canvas>> {
        self.shared
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PixelSink for MemorySink {
    fn present_frame(&mut self, canvas: &Canvas) -> Result<(), DeviceError> {
        self.shared.attempts.fetch_add(1, Ordering::Relaxed);
        if self.shared.failing.load(Ordering::Relaxed) {
            return Err(DeviceError::Bus("memory sink set to fail".into()));
        }

        let mut frames = self.frames();
        if self.shared.capacity > 0 && frames.len() == self.shared.capacity {
            frames.remove(0);
        }
        frames.push(canvas.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let handle = MemorySink::new();
        let mut sink = handle.clone();
        let mut canvas = Canvas::new(4, 4);
        canvas.set(0, 0, true);

        sink.present_frame(&canvas).unwrap();
        assert_eq!(handle.frame_count(), 1);
        assert_eq!(handle.attempts(), 1);
        assert_eq!(handle.last_frame(), Some(canvas));
    }

    #[test]
    fn test_memory_sink_failing() {
        let handle = MemorySink::failing();
        let mut sink = handle.clone();
        assert!(sink.present_frame(&Canvas::new(4, 4)).is_err());
        assert_eq!(handle.attempts(), 1);
        assert_eq!(handle.frame_count(), 0);

        handle.set_failing(false);
        assert!(sink.present_frame(&Canvas::new(4, 4)).is_ok());
        assert_eq!(handle.frame_count(), 1);
    }

    #[test]
    fn test_memory_sink_capacity() {
        let mut sink = MemorySink::with_capacity(2);
        for i in 0..5 {
            let mut canvas = Canvas::new(8, 1);
            canvas.set(i, 0, true);
            sink.present_frame(&canvas).unwrap();
        }
        let frames = sink.recorded();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].get(3, 0));
        assert!(frames[1].get(4, 0));
    }
}
