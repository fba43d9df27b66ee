//! Inbound view model.
//!
//! This is the whole configuration surface of a grid: viewport size,
//! scrollbar handling, the per-axis size arrays, the body matrix, and the
//! optional header/footer bands. Field names follow the camelCase JSON the
//! browser host sends.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{CellMatrix, Position};
use crate::error::{GridError, Result};

/// Default scrollbar allowance in pixels.
pub const DEFAULT_SCROLLBAR_SIZE: f32 = 15.0;

/// Everything needed to lay out and resolve one grid
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GridViewModel<T> {
    /// Viewport width in pixels (including scrollbar space)
    pub width: f32,
    /// Viewport height in pixels (including scrollbar space)
    pub height: f32,
    /// Space reserved for native scrollbars
    #[serde(default = "default_scrollbar_size")]
    pub scrollbar_size: f32,
    /// When set, no space is reserved for scrollbars
    #[serde(default)]
    pub hide_scrollbars: bool,
    /// Cap on emitted body cells while actively scrolling
    #[serde(default)]
    pub max_cells_while_scrolling: Option<usize>,
    /// Initial horizontal scroll offset
    #[serde(default)]
    pub x: f32,
    /// Initial vertical scroll offset
    #[serde(default)]
    pub y: f32,
    /// Body column widths
    pub col_widths: Vec<f32>,
    /// Body row heights
    pub row_heights: Vec<f32>,
    /// Body cells
    #[serde(default)]
    pub cells: CellMatrix<T>,
    /// Column header band, row header band and their corners
    #[serde(default)]
    pub headers: Option<BandSet<T>>,
    /// Column footer band, row footer band and their corners
    #[serde(default)]
    pub footers: Option<BandSet<T>>,
}

fn default_scrollbar_size() -> f32 {
    DEFAULT_SCROLLBAR_SIZE
}

/// Header or footer descriptor.
///
/// The left corner matrix sits where this band's column band meets the row
/// header band; the right one where it meets the row footer band.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct BandSet<T> {
    #[serde(default, alias = "colHeader", alias = "colFooter")]
    pub columns: Option<ColumnBand<T>>,
    #[serde(default, alias = "rowHeader", alias = "rowFooter")]
    pub rows: Option<RowBand<T>>,
    #[serde(default)]
    pub left_intersections: CellMatrix<T>,
    #[serde(default)]
    pub right_intersections: CellMatrix<T>,
}

/// Horizontal band: its own row heights, body column widths.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ColumnBand<T> {
    pub heights: Vec<f32>,
    #[serde(default)]
    pub cells: CellMatrix<T>,
}

/// Vertical band: body row heights, its own column widths.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RowBand<T> {
    pub widths: Vec<f32>,
    #[serde(default)]
    pub cells: CellMatrix<T>,
}

impl<T> Default for BandSet<T> {
    fn default() -> Self {
        Self {
            columns: None,
            rows: None,
            left_intersections: CellMatrix::new(),
            right_intersections: CellMatrix::new(),
        }
    }
}

impl<T> ColumnBand<T> {
    pub fn new(heights: Vec<f32>, cells: CellMatrix<T>) -> Self {
        Self { heights, cells }
    }
}

impl<T> RowBand<T> {
    pub fn new(widths: Vec<f32>, cells: CellMatrix<T>) -> Self {
        Self { widths, cells }
    }
}

impl<T: DeserializeOwned> GridViewModel<T> {
    /// Decode and validate a JSON view model.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }
}

impl<T> GridViewModel<T> {
    /// A body-only view model with no bands and the default scrollbar size.
    pub fn new(width: f32, height: f32, col_widths: Vec<f32>, row_heights: Vec<f32>) -> Self {
        Self {
            width,
            height,
            scrollbar_size: DEFAULT_SCROLLBAR_SIZE,
            hide_scrollbars: false,
            max_cells_while_scrolling: None,
            x: 0.0,
            y: 0.0,
            col_widths,
            row_heights,
            cells: CellMatrix::new(),
            headers: None,
            footers: None,
        }
    }

    pub fn with_cells(mut self, cells: CellMatrix<T>) -> Self {
        self.cells = cells;
        self
    }

    pub fn with_headers(mut self, headers: BandSet<T>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_footers(mut self, footers: BandSet<T>) -> Self {
        self.footers = Some(footers);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.row_heights.len()
    }

    pub fn num_cols(&self) -> usize {
        self.col_widths.len()
    }

    /// Scrollbar space actually reserved (0 when scrollbars are hidden).
    pub fn scrollbar_allowance(&self) -> f32 {
        if self.hide_scrollbars {
            0.0
        } else {
            self.scrollbar_size
        }
    }

    /// Drawable viewport size once scrollbar space is taken out.
    pub fn content_viewport_size(&self) -> (f32, f32) {
        let allowance = self.scrollbar_allowance();
        (
            (self.width - allowance).max(0.0),
            (self.height - allowance).max(0.0),
        )
    }

    /// Scroll offset requested by the model (`x`, `y`)
    pub fn initial_scroll(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn column_header(&self) -> Option<&ColumnBand<T>> {
        self.headers.as_ref()?.columns.as_ref()
    }

    pub fn row_header(&self) -> Option<&RowBand<T>> {
        self.headers.as_ref()?.rows.as_ref()
    }

    pub fn column_footer(&self) -> Option<&ColumnBand<T>> {
        self.footers.as_ref()?.columns.as_ref()
    }

    pub fn row_footer(&self) -> Option<&RowBand<T>> {
        self.footers.as_ref()?.rows.as_ref()
    }

    /// Remove body row `row` along with its row-header and row-footer rows.
    ///
    /// Sizes and matrices shift up so the next pass sees a consistent grid.
    pub fn remove_row(&mut self, row: u32) -> Result<()> {
        let idx = row as usize;
        if idx >= self.row_heights.len() {
            return Err(GridError::OutOfBounds {
                anchor: row,
                span: 1,
                len: self.row_heights.len(),
            });
        }
        self.row_heights.remove(idx);
        self.cells.remove_row(row);
        for bands in [self.headers.as_mut(), self.footers.as_mut()]
            .into_iter()
            .flatten()
        {
            if let Some(rows) = bands.rows.as_mut() {
                rows.cells.remove_row(row);
            }
        }
        Ok(())
    }

    /// Check sizes and that every cell, span included, fits inside its axes.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width >= 0.0)
            || !(self.height.is_finite() && self.height >= 0.0)
        {
            return Err(GridError::InvalidViewModel(format!(
                "viewport size {}x{} must be finite and non-negative",
                self.width, self.height
            )));
        }
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(GridError::InvalidViewModel(format!(
                "initial scroll ({}, {}) must be finite",
                self.x, self.y
            )));
        }
        check_sizes("colWidths", &self.col_widths)?;
        check_sizes("rowHeights", &self.row_heights)?;
        check_cells(&self.cells, self.row_heights.len(), self.col_widths.len())?;

        let row_header_cols = self.row_header().map_or(0, |b| b.widths.len());
        let row_footer_cols = self.row_footer().map_or(0, |b| b.widths.len());

        for bands in [self.headers.as_ref(), self.footers.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Some(columns) = &bands.columns {
                check_sizes("band heights", &columns.heights)?;
                check_cells(&columns.cells, columns.heights.len(), self.col_widths.len())?;
                check_cells(&bands.left_intersections, columns.heights.len(), row_header_cols)?;
                check_cells(
                    &bands.right_intersections,
                    columns.heights.len(),
                    row_footer_cols,
                )?;
            }
            if let Some(rows) = &bands.rows {
                check_sizes("band widths", &rows.widths)?;
                check_cells(&rows.cells, self.row_heights.len(), rows.widths.len())?;
            }
        }
        Ok(())
    }
}

fn check_sizes(name: &str, sizes: &[f32]) -> Result<()> {
    match sizes.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
        Some(i) => Err(GridError::InvalidViewModel(format!(
            "{name}[{i}] must be a positive finite size"
        ))),
        None => Ok(()),
    }
}

fn check_cells<T>(cells: &CellMatrix<T>, rows: usize, cols: usize) -> Result<()> {
    for (coord, cell) in cells.iter() {
        let col_end = coord.col as usize + cell.col_span() as usize;
        if col_end > cols {
            return Err(GridError::OutOfBounds {
                anchor: coord.col,
                span: cell.col_span(),
                len: cols,
            });
        }
        let row_end = coord.row as usize + cell.row_span() as usize;
        if row_end > rows {
            return Err(GridError::OutOfBounds {
                anchor: coord.row,
                span: cell.row_span(),
                len: rows,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::Cell;

    const JSON: &str = r#"{
        "width": 800,
        "height": 500,
        "maxCellsWhileScrolling": 200,
        "colWidths": [75, 75, 75],
        "rowHeights": [30, 30],
        "cells": [
            [{"viewModel": "0,0"}, {"viewModel": "0,1"}, {"viewModel": "0,2"}],
            [{"viewModel": "1,0"}, null, {"viewModel": "1,2"}]
        ],
        "headers": {
            "colHeader": {
                "heights": [30],
                "cells": [[{"viewModel": "C0"}, {"colspan": 2, "viewModel": "C1"}, null]]
            },
            "rowHeader": {
                "widths": [70],
                "cells": [[{"viewModel": "R0"}], [{"viewModel": "R1"}]]
            }
        }
    }"#;

    #[test]
    fn test_from_json() {
        let model = GridViewModel::<String>::from_json(JSON).unwrap();
        assert_eq!(model.num_cols(), 3);
        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.scrollbar_size, DEFAULT_SCROLLBAR_SIZE);
        assert_eq!(model.max_cells_while_scrolling, Some(200));
        assert_eq!(model.cells.len(), 5);
        assert_eq!(model.column_header().map(|b| b.heights.len()), Some(1));
        assert_eq!(model.row_header().map(|b| b.widths.clone()), Some(vec![70.0]));
        assert!(model.column_footer().is_none());
    }

    #[test]
    fn test_scrollbar_allowance() {
        let mut model = GridViewModel::<()>::new(800.0, 500.0, vec![10.0], vec![10.0]);
        assert_eq!(model.scrollbar_allowance(), 15.0);
        assert_eq!(model.content_viewport_size(), (785.0, 485.0));
        model.hide_scrollbars = true;
        assert_eq!(model.scrollbar_allowance(), 0.0);
        assert_eq!(model.content_viewport_size(), (800.0, 500.0));
    }

    #[test]
    fn test_validate_rejects_span_past_edge() {
        let mut cells = CellMatrix::new();
        cells.insert(0, 2, Cell::new(()).with_colspan(2));
        let model = GridViewModel::new(100.0, 100.0, vec![10.0; 3], vec![10.0]).with_cells(cells);
        match model.validate() {
            Err(GridError::OutOfBounds { anchor, span, len }) => {
                assert_eq!((anchor, span, len), (2, 2, 3));
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_non_positive_size() {
        let model = GridViewModel::<()>::new(100.0, 100.0, vec![10.0, 0.0], vec![10.0]);
        assert!(matches!(
            model.validate(),
            Err(GridError::InvalidViewModel(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_scroll() {
        let mut model = GridViewModel::<()>::new(100.0, 100.0, vec![10.0], vec![10.0]);
        model.x = f32::NAN;
        assert!(matches!(model.validate(), Err(GridError::InvalidViewModel(_))));
        model.x = 0.0;
        model.y = f32::INFINITY;
        assert!(matches!(model.validate(), Err(GridError::InvalidViewModel(_))));
    }

    #[test]
    fn test_remove_row_keeps_spans_valid() {
        let mut cells = CellMatrix::new();
        cells.insert(0, 0, Cell::new(()).with_rowspan(2));
        cells.insert(0, 1, Cell::new(()));
        cells.insert(1, 1, Cell::new(()));
        let mut row_header = CellMatrix::new();
        row_header.insert(0, 0, Cell::new(()).with_rowspan(2));
        let mut model = GridViewModel::new(100.0, 100.0, vec![10.0; 2], vec![10.0; 2])
            .with_cells(cells)
            .with_headers(BandSet {
                rows: Some(RowBand::new(vec![20.0], row_header)),
                ..BandSet::default()
            });

        model.remove_row(1).unwrap();

        model.validate().unwrap();
        assert_eq!(model.cells.get(0, 0).map(Cell::row_span), Some(1));
        assert_eq!(
            model.row_header().and_then(|b| b.cells.get(0, 0)).map(Cell::row_span),
            Some(1)
        );
    }

    #[test]
    fn test_remove_row_collapses_bands() {
        let mut model = GridViewModel::<String>::from_json(JSON).unwrap();
        model.remove_row(0).unwrap();
        assert_eq!(model.num_rows(), 1);
        assert_eq!(
            model.cells.get(0, 0).map(|c| c.content.as_str()),
            Some("1,0")
        );
        assert_eq!(
            model
                .row_header()
                .and_then(|b| b.cells.get(0, 0))
                .map(|c| c.content.as_str()),
            Some("R1")
        );
        assert!(model.remove_row(5).is_err());
    }
}
