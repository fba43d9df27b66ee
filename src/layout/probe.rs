//! Read-only view of the body matrix for the search and scan passes.

use super::geometry::GridMetrics;
use super::visibility::{overlaps_x, overlaps_y, CellRect, VerticalEdgeRule, ViewportRect};
use crate::error::Result;
use crate::types::{Cell, CellMatrix, CellRole};

/// Measures body cells against one viewport.
///
/// Never writes to the matrix; any coordinate bookkeeping is kept by the
/// caller.
pub struct BodyProbe<'a, T> {
    pub metrics: &'a GridMetrics,
    pub cells: &'a CellMatrix<T>,
    pub viewport: ViewportRect,
    pub allowance: f32,
    pub rule: VerticalEdgeRule,
}

impl<'a, T> BodyProbe<'a, T> {
    pub fn num_rows(&self) -> u32 {
        self.metrics.num_rows()
    }

    pub fn num_cols(&self) -> u32 {
        self.metrics.num_cols()
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&'a Cell<T>> {
        self.cells.get(row, col)
    }

    /// Geometry of the cell anchored at (row, col), or `None` when absent.
    pub fn probe(&self, row: u32, col: u32) -> Result<Option<CellRect>> {
        match self.cells.get(row, col) {
            Some(cell) => self.measure(cell, row, col).map(Some),
            None => Ok(None),
        }
    }

    pub fn measure(&self, cell: &Cell<T>, row: u32, col: u32) -> Result<CellRect> {
        self.metrics.cell_rect(
            CellRole::Body,
            row,
            col,
            cell.row_span(),
            cell.col_span(),
            &self.viewport,
            self.allowance,
            self.rule,
        )
    }

    /// True when a present cell at (row, col) lies outside the viewport.
    pub fn is_hidden_cell(&self, row: u32, col: u32) -> Result<bool> {
        Ok(self.probe(row, col)?.is_some_and(|rect| !rect.visible))
    }

    pub fn overlaps_x(&self, rect: &CellRect) -> bool {
        overlaps_x(rect.x, rect.width, &self.viewport)
    }

    pub fn overlaps_y(&self, rect: &CellRect) -> bool {
        overlaps_y(rect.y, rect.height, &self.viewport, self.rule)
    }
}
