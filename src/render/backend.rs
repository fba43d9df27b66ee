//! Cell renderer trait for pluggable drawing implementations.
//!
//! The engine decides what is on screen and where; a `CellRenderer` only
//! turns those records into pixels, DOM nodes, terminal cells, or whatever
//! the host draws with. It never sees absent or off-screen cells.

use serde::Serialize;

use crate::error::Result;
use crate::layout::{ResolvedCell, VisibleRange};
use crate::types::{CellRole, Position};

/// Data needed to draw a single cell
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRenderData<'a, T> {
    pub row: u32,
    pub col: u32,
    /// Left edge relative to the viewport
    pub x: f32,
    /// Top edge relative to the viewport
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub role: CellRole,
    pub colspan: u32,
    pub rowspan: u32,
    /// Stacking layer: body 0, bands 1, corners 2
    pub z_index: u8,
    /// Stable identity, e.g. `rowheader-12-0`
    pub key: String,
    /// Empty intersection slot with no configured cell
    pub filler: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_col_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<&'a str>,
    /// `None` for filler corner slots
    pub content: Option<&'a T>,
}

impl<'a, T> CellRenderData<'a, T> {
    pub fn is_filler(&self) -> bool {
        self.filler
    }
}

impl<'a, T> From<&ResolvedCell<'a, T>> for CellRenderData<'a, T> {
    fn from(cell: &ResolvedCell<'a, T>) -> Self {
        let (rowspan, colspan) = cell.cell.map_or((1, 1), |c| (c.row_span(), c.col_span()));
        Self {
            row: cell.coord.row,
            col: cell.coord.col,
            x: cell.screen_x,
            y: cell.screen_y,
            width: cell.rect.width,
            height: cell.rect.height,
            role: cell.role,
            colspan,
            rowspan,
            z_index: cell.role.z_layer(),
            key: cell.key(),
            filler: cell.is_filler(),
            aria_row_index: cell.aria_row_index(),
            aria_col_index: cell.aria_col_index(),
            renderer: cell.cell.and_then(|c| c.renderer.as_deref()),
            content: cell.content(),
        }
    }
}

/// Per-frame parameters passed to the renderer before any cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameParams {
    pub scroll: Position,
    /// Full component size
    pub width: f32,
    pub height: f32,
    /// Drawable size once scrollbar space is taken out
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Content size the host's scroll surface should span
    pub inner_width: f32,
    pub inner_height: f32,
    /// Body dimensions (aria-rowcount / aria-colcount)
    pub row_count: u32,
    pub col_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<VisibleRange>,
    /// Frame drawn with the low-detail cell cap
    pub scrolling: bool,
    /// Resolution failed; nothing but the frame itself is drawn
    pub degraded: bool,
}

/// Trait for cell renderers
///
/// Called once per redraw: `begin_frame`, `render_cell` for each cell in
/// emission order, then `end_frame`.
pub trait CellRenderer<T> {
    /// Start a frame (clear surfaces, size the scroll spacer, ...)
    fn begin_frame(&mut self, _params: &FrameParams) -> Result<()> {
        Ok(())
    }

    /// Draw one cell
    fn render_cell(&mut self, cell: &CellRenderData<'_, T>) -> Result<()>;

    /// Finish a frame (flush, present, ...)
    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T, F> CellRenderer<T> for F
where
    F: FnMut(&CellRenderData<'_, T>),
{
    fn render_cell(&mut self, cell: &CellRenderData<'_, T>) -> Result<()> {
        self(cell);
        Ok(())
    }
}
