//! powergrid - virtualized grid viewport resolution
//!
//! Given per-axis sizes, a sparse cell matrix and a scroll position, works
//! out which cells intersect the viewport and where to draw them:
//! - Prefix-sum geometry for body and pinned header/footer bands
//! - A coarse-to-fine search for one visible cell, then a linear scan to the
//!   visible range, so cost tracks what is on screen rather than grid size
//! - Row/column spans, empty gaps, pinned bands and corner intersections
//! - Clamped scrolling with a settle timer and a low-detail cell cap while
//!   scrolling
//!
//! # Usage
//!
//! ```
//! use powergrid::{Cell, CellMatrix, GridViewModel, PowerGrid, RecordingRenderer};
//!
//! let cells: CellMatrix<String> = (0..100u32)
//!     .flat_map(|r| (0..20u32).map(move |c| ((r, c), Cell::new(format!("{r}:{c}")))))
//!     .collect();
//! let model = GridViewModel::new(800.0, 500.0, vec![75.0; 20], vec![30.0; 100])
//!     .with_cells(cells);
//!
//! let mut grid = PowerGrid::new(model)?;
//! grid.attach();
//! let mut renderer = RecordingRenderer::new();
//! grid.tick(0.0, &mut renderer);
//! assert_eq!(renderer.last_frame().map(|f| f.cells.len()), Some(187));
//! # Ok::<(), powergrid::GridError>(())
//! ```
//!
//! In the browser the same engine is exported as `GridView`, which runs its
//! own `requestAnimationFrame` loop and draws through a JS callback.

pub mod error;
pub mod layout;
pub mod render;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::GridError;
pub use layout::{
    GridMetrics, ResolveOptions, ResolvedCell, SearchBudget, VerticalEdgeRule, ViewportCells,
    ViewportRect, ViewportResolver, VisibleRange,
};
pub use render::{CellRenderData, CellRenderer, FrameParams, RecordingRenderer};
pub use types::*;
pub use viewer::{FrameOutcome, PowerGrid, ScrollController, ScrollIntent};
#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

/// Crate version, for hosts that log what they loaded
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
