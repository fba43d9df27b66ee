//! Grow a visible range outward from a known-visible cell.
//!
//! Only the row and the column through the start cell are sampled, so the
//! cost is linear in one grid dimension rather than in the grid area. Visible
//! regions that are not rectangular (extreme span irregularity) can be
//! under-reported; that is the price of not touching the whole area.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::probe::BodyProbe;
use crate::error::Result;
use crate::types::CellCoord;

/// Inclusive body row/column bounds of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl VisibleRange {
    pub fn single(coord: CellCoord) -> Self {
        Self {
            min_row: coord.row,
            max_row: coord.row,
            min_col: coord.col,
            max_col: coord.col,
        }
    }

    pub fn rows(&self) -> RangeInclusive<u32> {
        self.min_row..=self.max_row
    }

    pub fn cols(&self) -> RangeInclusive<u32> {
        self.min_col..=self.max_col
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    pub fn row_count(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.max_col - self.min_col + 1
    }
}

/// Scan out from `start` in all four directions.
///
/// A scan stops at the grid edge or just before the first present cell that
/// is not visible; absent cells never stop it.
pub fn expand_range<T>(probe: &BodyProbe<'_, T>, start: CellCoord) -> Result<VisibleRange> {
    let rows = probe.num_rows();
    let cols = probe.num_cols();
    let CellCoord { row, col } = start;

    let min_col = scan(col, Toward::Start, cols, |c| probe.is_hidden_cell(row, c))?;
    let max_col = scan(col, Toward::End, cols, |c| probe.is_hidden_cell(row, c))?;
    let min_row = scan(row, Toward::Start, rows, |r| probe.is_hidden_cell(r, col))?;
    let max_row = scan(row, Toward::End, rows, |r| probe.is_hidden_cell(r, col))?;

    Ok(VisibleRange {
        min_row,
        max_row,
        min_col,
        max_col,
    })
}

#[derive(Clone, Copy)]
enum Toward {
    Start,
    End,
}

fn scan(
    from: u32,
    toward: Toward,
    len: u32,
    mut is_hidden: impl FnMut(u32) -> Result<bool>,
) -> Result<u32> {
    let mut last = from;
    loop {
        let next = match toward {
            Toward::Start => last.checked_sub(1),
            Toward::End => last.checked_add(1).filter(|n| *n < len),
        };
        let Some(next) = next else {
            return Ok(last);
        };
        if is_hidden(next)? {
            return Ok(last);
        }
        last = next;
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
    use crate::layout::{GridMetrics, VerticalEdgeRule, ViewportRect};
    use crate::types::{Cell, CellMatrix, GridViewModel};

    fn uniform(cols: u32, rows: u32) -> GridViewModel<()> {
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| ((r, c), Cell::new(()))))
            .collect::<CellMatrix<_>>();
        GridViewModel::new(800.0, 500.0, vec![75.0; cols as usize], vec![30.0; rows as usize])
            .with_cells(cells)
    }

    fn probe<'a, T>(
        metrics: &'a GridMetrics,
        cells: &'a CellMatrix<T>,
        x: f32,
        y: f32,
    ) -> BodyProbe<'a, T> {
        BodyProbe {
            metrics,
            cells,
            viewport: ViewportRect::new(x, y, 800.0, 500.0),
            allowance: 15.0,
            rule: VerticalEdgeRule::Symmetric,
        }
    }

    #[test]
    fn test_expands_to_top_left_viewport() {
        let model = uniform(100, 4000);
        let metrics = GridMetrics::new(&model);
        let p = probe(&metrics, &model.cells, 0.0, 0.0);

        let range = expand_range(&p, CellCoord::new(5, 5)).unwrap();
        assert_eq!(range, VisibleRange { min_row: 0, max_row: 16, min_col: 0, max_col: 10 });
        assert!(range.contains(5, 5));
    }

    #[test]
    fn test_expands_mid_grid() {
        let model = uniform(100, 4000);
        let metrics = GridMetrics::new(&model);
        // Viewport covers x 1000..1800, y 3000..3500.
        let p = probe(&metrics, &model.cells, 1000.0, 3000.0);

        let range = expand_range(&p, CellCoord::new(105, 15)).unwrap();
        // Column 13 spans 975..1050 and column 24 starts at 1800.
        assert_eq!((range.min_col, range.max_col), (13, 24));
        // Row 99 ends at 3000 exactly and row 116 starts at 3480.
        assert_eq!((range.min_row, range.max_row), (99, 116));
    }

    #[test]
    fn test_absent_cells_do_not_stop_scan() {
        let mut model = uniform(20, 20);
        // Knock out part of row 0; the scan must run through the gap.
        for c in 3..8 {
            model.cells.remove(0, c);
        }
        let metrics = GridMetrics::new(&model);
        let p = probe(&metrics, &model.cells, 0.0, 0.0);

        let range = expand_range(&p, CellCoord::new(0, 1)).unwrap();
        assert_eq!(range.max_col, 10);
    }

    #[test]
    fn test_all_absent_line_runs_to_edge() {
        let mut model = uniform(30, 5);
        for c in 1..30 {
            model.cells.remove(0, c);
        }
        let metrics = GridMetrics::new(&model);
        let p = probe(&metrics, &model.cells, 0.0, 0.0);

        let range = expand_range(&p, CellCoord::new(0, 0)).unwrap();
        assert_eq!(range.min_col, 0);
        assert_eq!(range.max_col, 29);
    }

    #[test]
    fn test_single_cell_grid() {
        let model = uniform(1, 1);
        let metrics = GridMetrics::new(&model);
        let p = probe(&metrics, &model.cells, 0.0, 0.0);
        let range = expand_range(&p, CellCoord::new(0, 0)).unwrap();
        assert_eq!(range, VisibleRange::single(CellCoord::new(0, 0)));
        assert_eq!((range.row_count(), range.col_count()), (1, 1));
    }
}
