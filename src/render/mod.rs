//! Outbound rendering interface.
//!
//! This module provides:
//! - The `CellRenderer` trait the host implements
//! - The per-cell and per-frame records handed to it
//! - A recording renderer for tests and headless hosts

pub mod backend;
mod recorder;

pub use backend::{CellRenderData, CellRenderer, FrameParams};
pub use recorder::{RecordedCell, RecordedFrame, RecordingRenderer};
