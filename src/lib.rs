//! # oled-rows
//!
//! A flicker-free text-row framebuffer for small monochrome OLED displays.
//!
//! Producers write text into numbered rows from any thread. Nothing reaches
//! the panel until the rows are committed; a single background thread then
//! redraws the latest committed rows at a fixed refresh rate.
//!
//! ## Core Concepts
//!
//! - **Staged vs. committed rows**: writes are private until `commit`
//! - **Snapshot gate**: the only lock shared with the render thread
//! - **Optional hardware**: a missing device is logged, never fatal
//! - **Injectable fonts and sinks**: rasterizer and device are traits
//!
//! ## Example
//!
//! ```rust,no_run
//! use oled_rows::{DisplayConfig, MemorySink, RowDisplay};
//!
//! let sink = MemorySink::new();
//! let display = RowDisplay::open(DisplayConfig::default(), |_| Ok(sink.clone()))?;
//! display.start()?;
//!
//! display.write_row(0, "Printing")?;
//! display.write_row(2, "B:60- T0:209-")?;
//! display.commit();
//!
//! display.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod buffer;
pub mod config;
pub mod display;
pub mod error;
pub mod render;
pub mod sink;
pub mod status;

// Re-exports for convenience
pub use actor::{RenderState, RenderStats};
pub use buffer::{Canvas, CommitGate, RowBuffer, RowEnd, RowSpan, Snapshot};
pub use config::DisplayConfig;
pub use display::RowDisplay;
pub use error::{ConfigError, DeviceError, LifecycleError, RowError};
pub use render::{MonoFontRasterizer, TextRasterizer};
pub use sink::{DetachedSink, MemorySink, PixelSink, Ssd1306, TerminalSink};
pub use status::{StatusBoard, ToolTemperature};
