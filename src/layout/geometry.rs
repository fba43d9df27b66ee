//! Pre-computed axis geometry for a grid.
//!
//! Offsets are computed once per view model so that cell positions are a
//! table lookup and hit testing is a binary search.

use std::cmp::Ordering;

use crate::types::GridViewModel;

/// Prefix sums of `sizes`, starting at `base`.
///
/// `offsets[i] = base + sizes[0..i].sum()`; the result has the same length as
/// `sizes`.
pub fn compute_offsets(sizes: &[f32], base: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut start = base;
    for size in sizes {
        offsets.push(start);
        start += size;
    }
    offsets
}

/// Far edge of the last slot, or 0 for an empty axis.
pub fn total_extent(offsets: &[f32], sizes: &[f32]) -> f32 {
    match (offsets.last(), sizes.last()) {
        (Some(offset), Some(size)) => offset + size,
        _ => 0.0,
    }
}

/// One axis system: sizes and the offsets derived from them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisTable {
    sizes: Vec<f32>,
    offsets: Vec<f32>,
    base: f32,
    extent: f32,
}

impl AxisTable {
    pub fn new(sizes: &[f32], base: f32) -> Self {
        let offsets = compute_offsets(sizes, base);
        let extent = total_extent(&offsets, sizes);
        Self {
            sizes: sizes.to_vec(),
            offsets,
            base,
            extent,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Number of slots as a coordinate bound
    pub fn count(&self) -> u32 {
        u32::try_from(self.sizes.len()).unwrap_or(u32::MAX)
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn size(&self, index: u32) -> Option<f32> {
        self.sizes.get(index as usize).copied()
    }

    pub fn offset(&self, index: u32) -> Option<f32> {
        self.offsets.get(index as usize).copied()
    }

    /// Far edge of the last slot including the base (0 when empty).
    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// Sum of all sizes, ignoring the base.
    pub fn span_total(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.extent - self.base
        }
    }

    /// Distance from the band start to the far edge of slot `index`.
    pub fn end_of(&self, index: u32) -> Option<f32> {
        Some(self.offset(index)? + self.size(index)? - self.base)
    }

    /// Slot containing position `pos` (binary search).
    ///
    /// Positions before the first slot clamp to 0, past the last to the last.
    pub fn index_at(&self, pos: f32) -> Option<u32> {
        if self.offsets.is_empty() {
            return None;
        }
        let idx = match self
            .offsets
            .binary_search_by(|o| o.partial_cmp(&pos).unwrap_or(Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        u32::try_from(idx).ok()
    }
}

/// Every axis table a grid needs, built from one view model.
///
/// Body columns start after the row header band and body rows start below
/// the column header band. Rebuilt whenever the view model changes; never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridMetrics {
    pub cols: AxisTable,
    pub rows: AxisTable,
    pub row_header: AxisTable,
    pub row_footer: AxisTable,
    pub col_header: AxisTable,
    pub col_footer: AxisTable,
}

impl GridMetrics {
    pub fn new<T>(model: &GridViewModel<T>) -> Self {
        let band = |sizes: Option<&Vec<f32>>| {
            AxisTable::new(sizes.map(Vec::as_slice).unwrap_or_default(), 0.0)
        };

        let row_header = band(model.row_header().map(|b| &b.widths));
        let row_footer = band(model.row_footer().map(|b| &b.widths));
        let col_header = band(model.column_header().map(|b| &b.heights));
        let col_footer = band(model.column_footer().map(|b| &b.heights));

        let cols = AxisTable::new(&model.col_widths, row_header.span_total());
        let rows = AxisTable::new(&model.row_heights, col_header.span_total());

        Self {
            cols,
            rows,
            row_header,
            row_footer,
            col_header,
            col_footer,
        }
    }

    /// Content width including the row header band (0 for no columns)
    pub fn inner_width(&self) -> f32 {
        self.cols.extent()
    }

    /// Content height including the column header band (0 for no rows)
    pub fn inner_height(&self) -> f32 {
        self.rows.extent()
    }

    pub fn num_cols(&self) -> u32 {
        self.cols.count()
    }

    pub fn num_rows(&self) -> u32 {
        self.rows.count()
    }

    pub fn total_row_header_width(&self) -> f32 {
        self.row_header.span_total()
    }

    pub fn total_row_footer_width(&self) -> f32 {
        self.row_footer.span_total()
    }

    pub fn total_col_header_height(&self) -> f32 {
        self.col_header.span_total()
    }

    pub fn total_col_footer_height(&self) -> f32 {
        self.col_footer.span_total()
    }

    /// Body column under content x
    pub fn col_at_x(&self, x: f32) -> Option<u32> {
        self.cols.index_at(x)
    }

    /// Body row under content y
    pub fn row_at_y(&self, y: f32) -> Option<u32> {
        self.rows.index_at(y)
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
    use crate::types::{BandSet, CellMatrix, ColumnBand, RowBand};

    #[test]
    fn test_compute_offsets() {
        assert_eq!(compute_offsets(&[10.0, 20.0, 5.0], 0.0), vec![0.0, 10.0, 30.0]);
        assert_eq!(compute_offsets(&[10.0, 20.0], 70.0), vec![70.0, 80.0]);
        assert!(compute_offsets(&[], 70.0).is_empty());
    }

    #[test]
    fn test_total_extent() {
        let sizes = [10.0, 20.0, 5.0];
        assert_eq!(total_extent(&compute_offsets(&sizes, 0.0), &sizes), 35.0);
        assert_eq!(total_extent(&compute_offsets(&sizes, 100.0), &sizes), 135.0);
    }

    #[test]
    fn test_empty_axis_has_zero_extent() {
        assert_eq!(total_extent(&[], &[]), 0.0);
        let table = AxisTable::new(&[], 70.0);
        assert_eq!(table.extent(), 0.0);
        assert_eq!(table.span_total(), 0.0);
        assert_eq!(table.index_at(10.0), None);
    }

    #[test]
    fn test_end_of() {
        let table = AxisTable::new(&[30.0, 20.0], 0.0);
        assert_eq!(table.end_of(0), Some(30.0));
        assert_eq!(table.end_of(1), Some(50.0));
        assert_eq!(table.end_of(2), None);
    }

    #[test]
    fn test_index_at() {
        let table = AxisTable::new(&[75.0; 10], 0.0);
        assert_eq!(table.index_at(0.0), Some(0));
        assert_eq!(table.index_at(74.0), Some(0));
        assert_eq!(table.index_at(75.0), Some(1));
        assert_eq!(table.index_at(-5.0), Some(0));
        assert_eq!(table.index_at(10_000.0), Some(9));
    }

    #[test]
    fn test_metrics_offset_body_by_bands() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 4], vec![30.0; 3])
            .with_headers(BandSet {
                columns: Some(ColumnBand::new(vec![30.0, 20.0], CellMatrix::new())),
                rows: Some(RowBand::new(vec![70.0], CellMatrix::new())),
                ..BandSet::default()
            });
        let metrics = GridMetrics::new(&model);

        assert_eq!(metrics.total_row_header_width(), 70.0);
        assert_eq!(metrics.total_col_header_height(), 50.0);
        assert_eq!(metrics.cols.offsets()[0], 70.0);
        assert_eq!(metrics.rows.offsets()[0], 50.0);
        assert_eq!(metrics.inner_width(), 70.0 + 300.0);
        assert_eq!(metrics.inner_height(), 50.0 + 90.0);
        assert_eq!(metrics.total_col_footer_height(), 0.0);
    }
}
