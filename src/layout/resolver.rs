//! Viewport resolution: which cells to hand to the renderer this frame.
//!
//! Runs the start-cell search and the range scan over the body, enumerates
//! the body range row by row, and wraps it with the pinned bands:
//!
//! ```text
//! [hdr-left corners] [column header cells, visible columns] [hdr-right corners]
//! [row header cells] [body cells, row by row]               [row footer cells]
//! [ftr-left corners] [column footer cells, visible columns] [ftr-right corners]
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use super::expander::{expand_range, VisibleRange};
use super::geometry::GridMetrics;
use super::locator::{locate_start_cell, SearchBudget, StartCell};
use super::probe::BodyProbe;
use super::visibility::{CellRect, VerticalEdgeRule, ViewportRect};
use crate::error::Result;
use crate::types::{BandSet, Cell, CellCoord, CellMatrix, CellRole, ColumnBand, GridViewModel, RowBand};

/// Knobs for one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Cap on emitted body cells; `None` means the whole range
    pub max_cells: Option<usize>,
    pub budget: SearchBudget,
    pub rule: VerticalEdgeRule,
}

/// One cell to draw, with its role and resolved geometry.
///
/// `cell` is `None` only for intersection slots with no configured cell;
/// those draw as empty filler.
#[derive(Debug)]
pub struct ResolvedCell<'a, T> {
    pub role: CellRole,
    pub coord: CellCoord,
    pub cell: Option<&'a Cell<T>>,
    /// Geometry in content space
    pub rect: CellRect,
    /// Left edge relative to the viewport
    pub screen_x: f32,
    /// Top edge relative to the viewport
    pub screen_y: f32,
}

impl<T> Clone for ResolvedCell<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResolvedCell<'_, T> {}

impl<'a, T> ResolvedCell<'a, T> {
    pub fn content(&self) -> Option<&'a T> {
        self.cell.map(|c| &c.content)
    }

    pub fn is_filler(&self) -> bool {
        self.cell.is_none()
    }

    /// Stable identity across frames, e.g. `gridcell-12-3`
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.role, self.coord.row, self.coord.col)
    }

    /// 1-based body row index for roles that sit on a body row
    pub fn aria_row_index(&self) -> Option<u32> {
        self.role
            .exposes_row_index()
            .then(|| self.coord.row.saturating_add(1))
    }

    /// 1-based body column index for roles that sit on a body column
    pub fn aria_col_index(&self) -> Option<u32> {
        self.role
            .exposes_col_index()
            .then(|| self.coord.col.saturating_add(1))
    }
}

/// Side lookup from body coordinate to the rect resolved for it this pass.
///
/// Kept by the engine so the caller's cells are never annotated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCells {
    rects: HashMap<CellCoord, CellRect>,
}

impl ResolvedCells {
    pub fn insert(&mut self, coord: CellCoord, rect: CellRect) {
        self.rects.insert(coord, rect);
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellRect> {
        self.rects.get(&CellCoord::new(row, col))
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.rects.contains_key(&CellCoord::new(row, col))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &CellRect)> {
        self.rects.iter()
    }
}

/// Everything resolved for one frame
#[derive(Debug)]
pub struct ViewportCells<'a, T> {
    /// Cells in emission order (see module docs)
    pub cells: Vec<ResolvedCell<'a, T>>,
    /// Body range; `None` for an empty grid or a degraded frame
    pub range: Option<VisibleRange>,
    /// Where the search landed
    pub start: Option<StartCell>,
    pub resolved: ResolvedCells,
    /// Body cells emitted (bands and corners not counted)
    pub body_count: usize,
    /// The body cap cut the enumeration short
    pub truncated: bool,
}

impl<T> Default for ViewportCells<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> ViewportCells<'a, T> {
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            range: None,
            start: None,
            resolved: ResolvedCells::default(),
            body_count: 0,
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn body(&self) -> impl Iterator<Item = &ResolvedCell<'a, T>> {
        self.with_role(CellRole::Body)
    }

    pub fn with_role(&self, role: CellRole) -> impl Iterator<Item = &ResolvedCell<'a, T>> {
        self.cells.iter().filter(move |c| c.role == role)
    }
}

/// Resolves one view model against one viewport.
pub struct ViewportResolver<'a, T> {
    model: &'a GridViewModel<T>,
    metrics: &'a GridMetrics,
    viewport: ViewportRect,
    options: ResolveOptions,
}

impl<'a, T> ViewportResolver<'a, T> {
    pub fn new(
        model: &'a GridViewModel<T>,
        metrics: &'a GridMetrics,
        viewport: ViewportRect,
        options: ResolveOptions,
    ) -> Self {
        Self {
            model,
            metrics,
            viewport,
            options,
        }
    }

    fn probe(&self) -> BodyProbe<'a, T> {
        BodyProbe {
            metrics: self.metrics,
            cells: &self.model.cells,
            viewport: self.viewport,
            allowance: self.model.scrollbar_allowance(),
            rule: self.options.rule,
        }
    }

    fn emit(
        &self,
        role: CellRole,
        row: u32,
        col: u32,
        cell: Option<&'a Cell<T>>,
    ) -> Result<ResolvedCell<'a, T>> {
        let (rowspan, colspan) = cell.map_or((1, 1), |c| (c.row_span(), c.col_span()));
        let rect = self.metrics.cell_rect(
            role,
            row,
            col,
            rowspan,
            colspan,
            &self.viewport,
            self.model.scrollbar_allowance(),
            self.options.rule,
        )?;
        Ok(ResolvedCell {
            role,
            coord: CellCoord::new(row, col),
            cell,
            rect,
            screen_x: rect.x - self.viewport.x,
            screen_y: rect.y - self.viewport.y,
        })
    }

    /// Search, scan, enumerate and compose the frame.
    ///
    /// An empty grid resolves to an empty frame. `NoVisibleCellFound` and
    /// `OutOfBounds` are returned as-is; the viewer decides how to degrade.
    pub fn resolve(&self) -> Result<ViewportCells<'a, T>> {
        let probe = self.probe();
        if probe.num_rows() == 0 || probe.num_cols() == 0 {
            return Ok(ViewportCells::empty());
        }

        let start = locate_start_cell(&probe, self.options.budget)?;
        let range = expand_range(&probe, start.coord)?;

        let mut frame = ViewportCells {
            start: Some(start),
            range: Some(range),
            ..ViewportCells::empty()
        };
        frame.resolved.insert(start.coord, start.rect);

        let headers = self.model.headers.as_ref();
        let footers = self.model.footers.as_ref();

        if let Some(bands) = headers {
            self.emit_column_band(
                &mut frame,
                bands,
                range,
                [
                    CellRole::HeaderIntersectionLeft,
                    CellRole::ColumnHeader,
                    CellRole::HeaderIntersectionRight,
                ],
            )?;
        }

        self.emit_body(&mut frame, range)?;

        if let Some(bands) = footers {
            self.emit_column_band(
                &mut frame,
                bands,
                range,
                [
                    CellRole::FooterIntersectionLeft,
                    CellRole::ColumnFooter,
                    CellRole::FooterIntersectionRight,
                ],
            )?;
        }

        debug!(
            start_row = start.coord.row,
            start_col = start.coord.col,
            search_iterations = start.iterations,
            min_row = range.min_row,
            max_row = range.max_row,
            min_col = range.min_col,
            max_col = range.max_col,
            body_cells = frame.body_count,
            total_cells = frame.cells.len(),
            truncated = frame.truncated,
            "viewport resolved"
        );

        Ok(frame)
    }

    /// Like [`resolve`](Self::resolve), but a failed start-cell search
    /// degrades to an empty frame instead of an error.
    pub fn resolve_or_empty(&self) -> Result<ViewportCells<'a, T>> {
        match self.resolve() {
            Err(err) if err.is_recoverable() => {
                warn!(%err, "no visible cell, resolving an empty viewport");
                Ok(ViewportCells::empty())
            }
            other => other,
        }
    }

    /// Row-major body enumeration with row header/footer cells around each
    /// row that produced at least one body cell.
    fn emit_body(&self, frame: &mut ViewportCells<'a, T>, range: VisibleRange) -> Result<()> {
        let cap = self.options.max_cells.unwrap_or(usize::MAX);
        let row_header = self.model.row_header();
        let row_footer = self.model.row_footer();
        let mut row_cells = Vec::new();

        'rows: for r in range.rows() {
            row_cells.clear();
            for c in range.cols() {
                let Some(cell) = self.model.cells.get(r, c) else {
                    continue;
                };
                // Only a present cell left out counts as truncation.
                if frame.body_count >= cap {
                    frame.truncated = true;
                    break;
                }
                let resolved = self.emit(CellRole::Body, r, c, Some(cell))?;
                frame.resolved.insert(resolved.coord, resolved.rect);
                frame.body_count += 1;
                row_cells.push(resolved);
            }

            if !row_cells.is_empty() {
                if let Some(band) = row_header {
                    self.emit_row_band(frame, band, r, CellRole::RowHeader)?;
                }
                frame.cells.append(&mut row_cells);
                if let Some(band) = row_footer {
                    self.emit_row_band(frame, band, r, CellRole::RowFooter)?;
                }
            }
            if frame.truncated {
                break 'rows;
            }
        }
        Ok(())
    }

    fn emit_row_band(
        &self,
        frame: &mut ViewportCells<'a, T>,
        band: &'a RowBand<T>,
        row: u32,
        role: CellRole,
    ) -> Result<()> {
        let band_cols = u32::try_from(band.widths.len()).unwrap_or(u32::MAX);
        for c in 0..band_cols {
            if let Some(cell) = band.cells.get(row, c) {
                frame.cells.push(self.emit(role, row, c, Some(cell))?);
            }
        }
        Ok(())
    }

    /// One column header or footer band: for each band row, the left
    /// corners, the band cells over the visible columns, the right corners.
    fn emit_column_band(
        &self,
        frame: &mut ViewportCells<'a, T>,
        bands: &'a BandSet<T>,
        range: VisibleRange,
        [left_role, band_role, right_role]: [CellRole; 3],
    ) -> Result<()> {
        let Some(ColumnBand { heights, cells }) = bands.columns.as_ref() else {
            return Ok(());
        };
        let band_rows = u32::try_from(heights.len()).unwrap_or(u32::MAX);
        let left = self.model.row_header().map(|b| b.widths.len());
        let right = self.model.row_footer().map(|b| b.widths.len());

        for r in 0..band_rows {
            if let Some(n) = left {
                self.emit_corners(frame, &bands.left_intersections, left_role, r, n)?;
            }
            for c in range.cols() {
                if let Some(cell) = cells.get(r, c) {
                    frame.cells.push(self.emit(band_role, r, c, Some(cell))?);
                }
            }
            if let Some(n) = right {
                self.emit_corners(frame, &bands.right_intersections, right_role, r, n)?;
            }
        }
        Ok(())
    }

    /// Every slot of a corner row is emitted; missing cells become filler.
    fn emit_corners(
        &self,
        frame: &mut ViewportCells<'a, T>,
        corners: &'a CellMatrix<T>,
        role: CellRole,
        row: u32,
        slots: usize,
    ) -> Result<()> {
        let slots = u32::try_from(slots).unwrap_or(u32::MAX);
        for c in 0..slots {
            frame.cells.push(self.emit(role, row, c, corners.get(row, c))?);
        }
        Ok(())
    }
}
