//! Buffer module: staged rows, committed snapshots, and the pixel canvas.
//!
//! This module contains:
//! - [`RowBuffer`]: the live text rows producers write into
//! - [`CommitGate`]: the lock-guarded slot holding the committed [`Snapshot`]
//! - [`Canvas`]: the 1-bit pixel buffer rebuilt on every render tick

mod canvas;
mod commit;
mod rows;

pub use canvas::Canvas;
pub use commit::{CommitGate, Snapshot};
pub use rows::{RowBuffer, RowEnd, RowSpan};
