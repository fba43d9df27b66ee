//! Sparse cell storage.
//!
//! A grid is not required to have a cell at every coordinate: a coordinate may
//! be covered by a span anchored elsewhere, or just be empty space. Storage is
//! keyed by anchor coordinate so that a grid with millions of logical slots
//! only pays for the cells that exist.

use std::collections::HashMap;

use serde::Deserialize;

use super::{Cell, CellCoord};

/// Sparse matrix of cells keyed by anchor (row, col)
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "MatrixRepr<T>")]
pub struct CellMatrix<T> {
    cells: HashMap<(u32, u32), Cell<T>>,
}

/// Wire forms accepted for a matrix.
///
/// `Rows` is the dense array-of-rows shape with `null` gaps; `Entries` is an
/// explicit list for grids too sparse to spell out row by row.
#[derive(Deserialize)]
#[serde(untagged)]
enum MatrixRepr<T> {
    Rows(Vec<Vec<Option<Cell<T>>>>),
    Entries(Vec<MatrixEntry<T>>),
}

#[derive(Deserialize)]
struct MatrixEntry<T> {
    row: u32,
    col: u32,
    cell: Cell<T>,
}

impl<T> From<MatrixRepr<T>> for CellMatrix<T> {
    fn from(repr: MatrixRepr<T>) -> Self {
        match repr {
            MatrixRepr::Rows(rows) => Self::from_rows(rows),
            MatrixRepr::Entries(entries) => entries
                .into_iter()
                .map(|e| ((e.row, e.col), e.cell))
                .collect(),
        }
    }
}

impl<T> Default for CellMatrix<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<((u32, u32), Cell<T>)> for CellMatrix<T> {
    fn from_iter<I: IntoIterator<Item = ((u32, u32), Cell<T>)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<T> CellMatrix<T> {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Build from dense rows; `None` entries stay absent.
    pub fn from_rows(rows: Vec<Vec<Option<Cell<T>>>>) -> Self {
        let mut cells = HashMap::new();
        for (r, row) in rows.into_iter().enumerate() {
            let Ok(r) = u32::try_from(r) else { break };
            for (c, cell) in row.into_iter().enumerate() {
                let Ok(c) = u32::try_from(c) else { break };
                if let Some(cell) = cell {
                    cells.insert((r, c), cell);
                }
            }
        }
        Self { cells }
    }

    /// Cell anchored at (row, col), if any
    pub fn get(&self, row: u32, col: u32) -> Option<&Cell<T>> {
        self.cells.get(&(row, col))
    }

    /// Place a cell, returning whatever was anchored there before.
    pub fn insert(&mut self, row: u32, col: u32, cell: Cell<T>) -> Option<Cell<T>> {
        self.cells.insert((row, col), cell)
    }

    pub fn remove(&mut self, row: u32, col: u32) -> Option<Cell<T>> {
        self.cells.remove(&(row, col))
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.cells.contains_key(&(row, col))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All anchored cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Cell<T>)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellCoord { row, col }, cell))
    }

    /// Drop every cell anchored on `row` and shift the rows below it up by one.
    ///
    /// Cells anchored above `row` whose span reaches into it lose one row.
    pub fn remove_row(&mut self, row: u32) {
        let cells = std::mem::take(&mut self.cells);
        self.cells = cells
            .into_iter()
            .filter(|((r, _), _)| *r != row)
            .map(|((r, c), mut cell)| {
                if r > row {
                    return ((r - 1, c), cell);
                }
                if r.saturating_add(cell.row_span()) > row {
                    cell.rowspan = cell.row_span() - 1;
                }
                ((r, c), cell)
            })
            .collect();
    }
}
