//! Span resolution and per-role axis selection.
//!
//! Each cell role measures against one horizontal and one vertical axis
//! table. The role is mapped to its pair once per call; everything after that
//! is role-agnostic.

use super::geometry::{AxisTable, GridMetrics};
use super::visibility::{CellRect, VerticalEdgeRule, ViewportRect};
use crate::error::{GridError, Result};
use crate::types::CellRole;

/// The six axis systems of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// Body columns (horizontal, scrolls)
    Columns,
    /// Body rows (vertical, scrolls)
    Rows,
    /// Row header band columns (horizontal, pinned left)
    RowHeader,
    /// Row footer band columns (horizontal, pinned right)
    RowFooter,
    /// Column header band rows (vertical, pinned top)
    ColumnHeader,
    /// Column footer band rows (vertical, pinned bottom)
    ColumnFooter,
}

/// Where an axis sits relative to the scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Moves with the content
    Scrolling,
    /// Fixed at the start edge of the viewport
    PinnedStart,
    /// Fixed at the end edge of the viewport, inside the scrollbar allowance
    PinnedEnd,
}

impl AxisRole {
    pub fn placement(self) -> Placement {
        match self {
            Self::Columns | Self::Rows => Placement::Scrolling,
            Self::RowHeader | Self::ColumnHeader => Placement::PinnedStart,
            Self::RowFooter | Self::ColumnFooter => Placement::PinnedEnd,
        }
    }
}

impl CellRole {
    /// (horizontal, vertical) axis systems this role measures against
    pub fn axes(self) -> (AxisRole, AxisRole) {
        match self {
            Self::Body => (AxisRole::Columns, AxisRole::Rows),
            Self::ColumnHeader => (AxisRole::Columns, AxisRole::ColumnHeader),
            Self::ColumnFooter => (AxisRole::Columns, AxisRole::ColumnFooter),
            Self::RowHeader => (AxisRole::RowHeader, AxisRole::Rows),
            Self::RowFooter => (AxisRole::RowFooter, AxisRole::Rows),
            Self::HeaderIntersectionLeft => (AxisRole::RowHeader, AxisRole::ColumnHeader),
            Self::HeaderIntersectionRight => (AxisRole::RowFooter, AxisRole::ColumnHeader),
            Self::FooterIntersectionLeft => (AxisRole::RowHeader, AxisRole::ColumnFooter),
            Self::FooterIntersectionRight => (AxisRole::RowFooter, AxisRole::ColumnFooter),
        }
    }
}

/// Sum `span` consecutive sizes starting at `anchor`.
///
/// Spans are never clipped: a span crossing the end of the table is an
/// `OutOfBounds` error.
pub fn resolve_extent(sizes: &[f32], anchor: u32, span: u32) -> Result<f32> {
    let start = anchor as usize;
    let end = start.saturating_add(span as usize);
    sizes
        .get(start..end)
        .map(|slots| slots.iter().sum())
        .ok_or(GridError::OutOfBounds {
            anchor,
            span,
            len: sizes.len(),
        })
}

/// Scroll offset and viewport size shared by every placement on one axis
#[derive(Debug, Clone, Copy)]
struct AxisFrame {
    scroll: f32,
    viewport: f32,
    allowance: f32,
}

fn place(table: &AxisTable, placement: Placement, index: u32, frame: AxisFrame) -> Result<f32> {
    let out_of_bounds = || GridError::OutOfBounds {
        anchor: index,
        span: 1,
        len: table.len(),
    };
    match placement {
        Placement::Scrolling => table.offset(index).ok_or_else(out_of_bounds),
        Placement::PinnedStart => {
            let offset = table.offset(index).ok_or_else(out_of_bounds)?;
            Ok(frame.scroll + offset - table.base())
        }
        Placement::PinnedEnd => {
            let end = table.end_of(index).ok_or_else(out_of_bounds)?;
            Ok(frame.scroll + frame.viewport - end - frame.allowance)
        }
    }
}

impl GridMetrics {
    pub fn table(&self, axis: AxisRole) -> &AxisTable {
        match axis {
            AxisRole::Columns => &self.cols,
            AxisRole::Rows => &self.rows,
            AxisRole::RowHeader => &self.row_header,
            AxisRole::RowFooter => &self.row_footer,
            AxisRole::ColumnHeader => &self.col_header,
            AxisRole::ColumnFooter => &self.col_footer,
        }
    }

    /// Width of a cell of `role` anchored at `col` spanning `colspan` slots.
    pub fn cell_width(&self, role: CellRole, col: u32, colspan: u32) -> Result<f32> {
        let (h, _) = role.axes();
        resolve_extent(self.table(h).sizes(), col, colspan)
    }

    /// Height of a cell of `role` anchored at `row` spanning `rowspan` slots.
    pub fn cell_height(&self, role: CellRole, row: u32, rowspan: u32) -> Result<f32> {
        let (_, v) = role.axes();
        resolve_extent(self.table(v).sizes(), row, rowspan)
    }

    /// Full content-space geometry of a cell, classified against `viewport`.
    ///
    /// Pinned-end bands are placed `allowance` pixels in from the viewport's
    /// far edge so they clear the scrollbar.
    #[allow(clippy::too_many_arguments)]
    pub fn cell_rect(
        &self,
        role: CellRole,
        row: u32,
        col: u32,
        rowspan: u32,
        colspan: u32,
        viewport: &ViewportRect,
        allowance: f32,
        rule: VerticalEdgeRule,
    ) -> Result<CellRect> {
        let (h, v) = role.axes();
        let h_table = self.table(h);
        let v_table = self.table(v);

        let x = place(
            h_table,
            h.placement(),
            col,
            AxisFrame {
                scroll: viewport.x,
                viewport: viewport.width,
                allowance,
            },
        )?;
        let y = place(
            v_table,
            v.placement(),
            row,
            AxisFrame {
                scroll: viewport.y,
                viewport: viewport.height,
                allowance,
            },
        )?;
        let width = resolve_extent(h_table.sizes(), col, colspan)?;
        let height = resolve_extent(v_table.sizes(), row, rowspan)?;

        Ok(CellRect::classify(x, y, width, height, viewport, rule))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{BandSet, CellMatrix, ColumnBand, GridViewModel, RowBand};

    fn banded_metrics() -> GridMetrics {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 4000])
            .with_headers(BandSet {
                columns: Some(ColumnBand::new(vec![30.0, 20.0], CellMatrix::new())),
                rows: Some(RowBand::new(vec![70.0, 10.0], CellMatrix::new())),
                ..BandSet::default()
            })
            .with_footers(BandSet {
                columns: Some(ColumnBand::new(vec![25.0], CellMatrix::new())),
                rows: Some(RowBand::new(vec![40.0], CellMatrix::new())),
                ..BandSet::default()
            });
        GridMetrics::new(&model)
    }

    #[test]
    fn test_resolve_extent_single() {
        let sizes = [10.0, 20.0, 30.0];
        assert_eq!(resolve_extent(&sizes, 1, 1).unwrap(), 20.0);
    }

    #[test]
    fn test_resolve_extent_span() {
        let sizes = [10.0, 20.0, 30.0];
        assert_eq!(resolve_extent(&sizes, 0, 3).unwrap(), 60.0);
        assert_eq!(resolve_extent(&sizes, 1, 2).unwrap(), 50.0);
    }

    #[test]
    fn test_resolve_extent_out_of_bounds() {
        let sizes = [10.0, 20.0, 30.0];
        match resolve_extent(&sizes, 2, 2) {
            Err(GridError::OutOfBounds { anchor, span, len }) => {
                assert_eq!((anchor, span, len), (2, 2, 3));
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        assert!(resolve_extent(&sizes, 7, 1).is_err());
        assert!(resolve_extent(&[], 0, 1).is_err());
    }

    #[test]
    fn test_every_role_has_distinct_axis_pair() {
        let mut seen = std::collections::HashSet::new();
        for role in CellRole::ALL {
            assert!(seen.insert(role.axes()), "{role} shares axes with another role");
        }
    }

    #[test]
    fn test_body_rect_scrolls() {
        let metrics = banded_metrics();
        let vp = ViewportRect::new(150.0, 60.0, 800.0, 500.0);
        let rect = metrics
            .cell_rect(CellRole::Body, 2, 3, 1, 2, &vp, 15.0, VerticalEdgeRule::Symmetric)
            .unwrap();
        // Body columns start after the 80px row header band, rows after the 50px column header band.
        assert_eq!(rect.x, 80.0 + 3.0 * 75.0);
        assert_eq!(rect.y, 50.0 + 2.0 * 30.0);
        assert_eq!(rect.width, 150.0);
        assert_eq!(rect.height, 30.0);
        assert!(rect.visible);
    }

    #[test]
    fn test_header_bands_pin_to_start() {
        let metrics = banded_metrics();
        let vp = ViewportRect::new(150.0, 600.0, 800.0, 500.0);

        let col_header = metrics
            .cell_rect(CellRole::ColumnHeader, 1, 4, 1, 1, &vp, 15.0, VerticalEdgeRule::Symmetric)
            .unwrap();
        assert_eq!(col_header.x, 80.0 + 4.0 * 75.0);
        assert_eq!(col_header.y, 600.0 + 30.0);
        assert_eq!(col_header.height, 20.0);

        let row_header = metrics
            .cell_rect(CellRole::RowHeader, 20, 1, 1, 1, &vp, 15.0, VerticalEdgeRule::Symmetric)
            .unwrap();
        assert_eq!(row_header.x, 150.0 + 70.0);
        assert_eq!(row_header.y, 50.0 + 20.0 * 30.0);
        assert_eq!(row_header.width, 10.0);
    }

    #[test]
    fn test_footer_bands_pin_to_end() {
        let metrics = banded_metrics();
        let vp = ViewportRect::new(150.0, 600.0, 800.0, 500.0);

        let col_footer = metrics
            .cell_rect(CellRole::ColumnFooter, 0, 0, 1, 1, &vp, 15.0, VerticalEdgeRule::Symmetric)
            .unwrap();
        assert_eq!(col_footer.y, 600.0 + 500.0 - 25.0 - 15.0);

        let corner = metrics
            .cell_rect(
                CellRole::FooterIntersectionRight,
                0,
                0,
                1,
                1,
                &vp,
                15.0,
                VerticalEdgeRule::Symmetric,
            )
            .unwrap();
        assert_eq!(corner.x, 150.0 + 800.0 - 40.0 - 15.0);
        assert_eq!(corner.y, 600.0 + 500.0 - 25.0 - 15.0);
        assert_eq!((corner.width, corner.height), (40.0, 25.0));
    }

    #[test]
    fn test_header_intersection_left() {
        let metrics = banded_metrics();
        let vp = ViewportRect::new(0.0, 0.0, 800.0, 500.0);
        let rect = metrics
            .cell_rect(
                CellRole::HeaderIntersectionLeft,
                1,
                1,
                1,
                1,
                &vp,
                15.0,
                VerticalEdgeRule::Symmetric,
            )
            .unwrap();
        assert_eq!((rect.x, rect.y), (70.0, 30.0));
        assert_eq!((rect.width, rect.height), (10.0, 20.0));
    }

    #[test]
    fn test_missing_band_is_out_of_bounds() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0], vec![30.0]);
        let metrics = GridMetrics::new(&model);
        let vp = ViewportRect::new(0.0, 0.0, 800.0, 500.0);
        assert!(metrics
            .cell_rect(CellRole::RowHeader, 0, 0, 1, 1, &vp, 0.0, VerticalEdgeRule::Symmetric)
            .is_err());
    }
}
