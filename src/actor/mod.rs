//! Actor module: the background thread that owns the display.
//!
//! ```text
//! ┌──────────────┐  write_row / commit  ┌────────────┐
//! │  Producers   │ ───────────────────▶ │ CommitGate │
//! └──────────────┘                      └─────┬──────┘
//!                                             │ read() every tick
//!                                             ▼
//!                                      ┌──────────────┐  present_frame
//!                                      │ Render Thread│ ─────────────▶ sink
//!                                      └──────────────┘
//! ```

mod render_loop;

pub(crate) use render_loop::StateCell;
pub use render_loop::{RenderLoop, RenderState, RenderStats};
