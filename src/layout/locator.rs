//! Bisection search for any one visible body cell.
//!
//! The search starts at the centre of the matrix and jumps a quarter of the
//! grid toward the viewport, halving the jump each time it lands on a
//! present but hidden cell. An absent anchor nudges the probe one step
//! diagonally and tries again at the same jump size. Expected cost is
//! logarithmic in the grid dimensions.
//!
//! The diagonal nudge never changes `row - col` parity, so a grid tiled with
//! even merges can hide every anchor from it. When the probes run out, the
//! cell under the viewport centre is looked up directly before giving up;
//! only hopeless inputs (grid entirely off-screen, enormous gaps) end in
//! `NoVisibleCellFound`.

use tracing::trace;

use super::probe::BodyProbe;
use super::visibility::{CellRect, Heading};
use crate::error::{GridError, Result};
use crate::types::CellCoord;

/// Extra iterations allowed on top of `rows + cols`.
pub const SEARCH_SLACK: usize = 64;

/// Iteration limit for the start-cell search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchBudget {
    /// `rows + cols + SEARCH_SLACK`
    #[default]
    Auto,
    /// Exactly this many probes
    Fixed(usize),
}

impl SearchBudget {
    pub fn limit(self, rows: u32, cols: u32) -> usize {
        match self {
            Self::Auto => (rows as usize)
                .saturating_add(cols as usize)
                .saturating_add(SEARCH_SLACK),
            Self::Fixed(n) => n,
        }
    }
}

/// A visible body cell and where it was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartCell {
    pub coord: CellCoord,
    pub rect: CellRect,
    /// Probes spent, including the successful one
    pub iterations: usize,
}

/// Find one visible body cell.
pub fn locate_start_cell<T>(probe: &BodyProbe<'_, T>, budget: SearchBudget) -> Result<StartCell> {
    let rows = probe.num_rows();
    let cols = probe.num_cols();
    if rows == 0 || cols == 0 {
        return Err(GridError::NoVisibleCellFound { iterations: 0 });
    }

    let limit = budget.limit(rows, cols);
    let mut row = rows / 2;
    let mut col = cols / 2;
    let mut depth: u32 = 0;

    for iteration in 1..=limit {
        match probe.probe(row, col)? {
            Some(rect) if rect.visible => {
                trace!(row, col, iteration, "start cell found");
                return Ok(StartCell {
                    coord: CellCoord::new(row, col),
                    rect,
                    iterations: iteration,
                });
            }
            Some(rect) => {
                // An axis already overlapping the viewport stays put.
                if !probe.overlaps_x(&rect) {
                    col = step(col, cols, depth, rect.direction.x);
                }
                if !probe.overlaps_y(&rect) {
                    row = step(row, rows, depth, rect.direction.y);
                }
                depth = depth.saturating_add(1);
            }
            None => {
                row = (row + 1) % rows;
                col = (col + 1) % cols;
            }
        }
    }

    if let Some(mut start) = cover_center(probe, limit)? {
        start.iterations = start.iterations.saturating_add(limit);
        return Ok(start);
    }
    Err(GridError::NoVisibleCellFound { iterations: limit })
}

/// Anchor of the cell covering the viewport centre, if that cell is visible.
///
/// Walks left along each row and then up, from the centre slot. The first
/// present cell met on a row either covers the centre or blocks every cell
/// further left from reaching it. At most `limit` slots are looked at.
fn cover_center<T>(probe: &BodyProbe<'_, T>, limit: usize) -> Result<Option<StartCell>> {
    let metrics = probe.metrics;
    let (Some(center_row), Some(center_col)) = (
        metrics.row_at_y(probe.viewport.center_y()),
        metrics.col_at_x(probe.viewport.center_x()),
    ) else {
        return Ok(None);
    };

    let mut looked = 0usize;
    for row in (0..=center_row).rev() {
        for col in (0..=center_col).rev() {
            looked += 1;
            if looked > limit {
                return Ok(None);
            }
            let Some(cell) = probe.cell(row, col) else {
                continue;
            };
            let covers = row.saturating_add(cell.row_span()) > center_row
                && col.saturating_add(cell.col_span()) > center_col;
            if !covers {
                break;
            }
            let rect = probe.measure(cell, row, col)?;
            if !rect.visible {
                return Ok(None);
            }
            trace!(row, col, looked, "start cell found under viewport centre");
            return Ok(Some(StartCell {
                coord: CellCoord::new(row, col),
                rect,
                iterations: looked,
            }));
        }
    }
    Ok(None)
}

/// Move `index` by a quarter of `len` halved `depth` times, at least one slot,
/// staying inside `0..len`.
fn step(index: u32, len: u32, depth: u32, heading: Heading) -> u32 {
    let jump = len
        .checked_shr(depth.saturating_add(2))
        .unwrap_or(0)
        .max(1);
    match heading {
        Heading::Forward => index.saturating_add(jump).min(len - 1),
        Heading::Backward => index.saturating_sub(jump),
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

    fn full_model(cols: u32, rows: u32) -> GridViewModel<(u32, u32)> {
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| ((r, c), Cell::new((r, c)))))
            .collect::<CellMatrix<_>>();
        GridViewModel::new(800.0, 500.0, vec![75.0; cols as usize], vec![30.0; rows as usize])
            .with_cells(cells)
    }

    fn probe_at<'a, T>(
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
    fn test_step_halves_and_clamps() {
        assert_eq!(step(2000, 4000, 0, Heading::Forward), 3000);
        assert_eq!(step(2000, 4000, 1, Heading::Backward), 1500);
        assert_eq!(step(3990, 4000, 0, Heading::Forward), 3999);
        assert_eq!(step(5, 4000, 0, Heading::Backward), 0);
        // Once the quarter-jump rounds to zero we still move one slot.
        assert_eq!(step(1, 3, 5, Heading::Forward), 2);
        assert_eq!(step(0, 1, 40, Heading::Forward), 0);
    }

    #[test]
    fn test_finds_top_left_in_logarithmic_steps() {
        let model = full_model(100, 4000);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 0.0, 0.0);

        let start = locate_start_cell(&probe, SearchBudget::Auto).unwrap();
        assert!(start.rect.visible);
        assert!(start.coord.col <= 10);
        assert!(start.coord.row <= 16);
        assert!(start.iterations < 40, "took {} iterations", start.iterations);
    }

    #[test]
    fn test_finds_bottom_right() {
        let model = full_model(100, 4000);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 6715.0, 119_515.0);

        let start = locate_start_cell(&probe, SearchBudget::Auto).unwrap();
        assert!(start.rect.visible);
        assert!(start.coord.col >= 89);
        assert!(start.coord.row >= 3983);
    }

    #[test]
    fn test_skips_sparse_gaps() {
        // Only every third column of every row is present.
        let cells = (0..400u32)
            .flat_map(|r| (0..60u32).filter(|c| c % 3 == 0).map(move |c| ((r, c), Cell::new(()))))
            .collect::<CellMatrix<_>>();
        let model = GridViewModel::new(800.0, 500.0, vec![75.0; 60], vec![30.0; 400])
            .with_cells(cells);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 1200.0, 3000.0);

        let start = locate_start_cell(&probe, SearchBudget::Auto).unwrap();
        assert!(start.rect.visible);
        assert_eq!(start.coord.col % 3, 0);
    }

    #[test]
    fn test_even_merges_found_through_centre() {
        // Every anchor sits at (even, even) and covers 2x2, so the diagonal
        // nudge from (50, 51) never lands on one.
        let cells = (0..100u32)
            .step_by(2)
            .flat_map(|r| {
                (0..102u32)
                    .step_by(2)
                    .map(move |c| ((r, c), Cell::new(()).with_rowspan(2).with_colspan(2)))
            })
            .collect::<CellMatrix<_>>();
        let model = GridViewModel::new(800.0, 500.0, vec![75.0; 102], vec![30.0; 100])
            .with_cells(cells);
        model.validate().unwrap();
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 0.0, 0.0);

        let start = locate_start_cell(&probe, SearchBudget::Auto).unwrap();
        // Centre (400, 250) falls in column 5, row 8: inside the merge at (8, 4).
        assert_eq!(start.coord, CellCoord::new(8, 4));
        assert!(start.rect.visible);
        assert!(start.iterations > SearchBudget::Auto.limit(100, 102));
    }

    #[test]
    fn test_centre_lookup_respects_budget() {
        let model = full_model(100, 4000);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 0.0, 0.0);
        assert!(matches!(
            locate_start_cell(&probe, SearchBudget::Fixed(0)),
            Err(GridError::NoVisibleCellFound { iterations: 0 })
        ));
    }

    #[test]
    fn test_off_screen_grid_fails_with_bound() {
        let model = full_model(10, 10);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 50_000.0, 50_000.0);

        match locate_start_cell(&probe, SearchBudget::Fixed(25)) {
            Err(GridError::NoVisibleCellFound { iterations }) => assert_eq!(iterations, 25),
            other => panic!("expected NoVisibleCellFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_grid() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![], vec![30.0]);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 0.0, 0.0);
        assert!(matches!(
            locate_start_cell(&probe, SearchBudget::Auto),
            Err(GridError::NoVisibleCellFound { iterations: 0 })
        ));
    }

    #[test]
    fn test_matrix_with_no_cells_exhausts_budget() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 5], vec![30.0; 5]);
        let metrics = GridMetrics::new(&model);
        let probe = probe_at(&metrics, &model.cells, 0.0, 0.0);
        assert!(matches!(
            locate_start_cell(&probe, SearchBudget::Auto),
            Err(GridError::NoVisibleCellFound { .. })
        ));
    }
}
