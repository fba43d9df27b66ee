//! Layout engine: grid geometry and viewport resolution.
//!
//! This module handles:
//! - Pre-computing offset tables from per-axis sizes
//! - Resolving cell extents across spans, per cell role
//! - Visibility testing against the viewport
//! - Finding a visible start cell and growing the visible range from it
//! - Enumerating the frame's cells, pinned bands included

mod axis;
mod expander;
mod geometry;
mod locator;
mod probe;
mod resolver;
mod viewport;
mod visibility;

pub use axis::{resolve_extent, AxisRole, Placement};
pub use expander::{expand_range, VisibleRange};
pub use geometry::{compute_offsets, total_extent, AxisTable, GridMetrics};
pub use locator::{locate_start_cell, SearchBudget, StartCell, SEARCH_SLACK};
pub use probe::BodyProbe;
pub use resolver::{
    ResolveOptions, ResolvedCell, ResolvedCells, ViewportCells, ViewportResolver,
};
pub use viewport::Viewport;
pub use visibility::{
    direction, is_visible, overlaps_x, overlaps_y, CellRect, Direction, Heading,
    VerticalEdgeRule, ViewportRect,
};
