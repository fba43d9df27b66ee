use serde::{Deserialize, Serialize};

/// Which part of the grid a cell belongs to.
///
/// Each role measures itself against its own pair of axis tables; see
/// [`CellRole::axes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellRole {
    /// Scrolling body cell
    Body,
    /// Column header band (pinned to the top)
    ColumnHeader,
    /// Column footer band (pinned to the bottom)
    ColumnFooter,
    /// Row header band (pinned to the left)
    RowHeader,
    /// Row footer band (pinned to the right)
    RowFooter,
    /// Column header band x row header band
    HeaderIntersectionLeft,
    /// Column header band x row footer band
    HeaderIntersectionRight,
    /// Column footer band x row header band
    FooterIntersectionLeft,
    /// Column footer band x row footer band
    FooterIntersectionRight,
}

impl CellRole {
    pub const ALL: [CellRole; 9] = [
        CellRole::Body,
        CellRole::ColumnHeader,
        CellRole::ColumnFooter,
        CellRole::RowHeader,
        CellRole::RowFooter,
        CellRole::HeaderIntersectionLeft,
        CellRole::HeaderIntersectionRight,
        CellRole::FooterIntersectionLeft,
        CellRole::FooterIntersectionRight,
    ];

    /// Short stable name, used in render keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "gridcell",
            Self::ColumnHeader => "columnheader",
            Self::ColumnFooter => "columnfoot",
            Self::RowHeader => "rowheader",
            Self::RowFooter => "rowfooter",
            Self::HeaderIntersectionLeft => "headerintersectionleft",
            Self::HeaderIntersectionRight => "headerintersectionright",
            Self::FooterIntersectionLeft => "footerintersectionleft",
            Self::FooterIntersectionRight => "footerintersectionright",
        }
    }

    pub fn is_intersection(self) -> bool {
        matches!(
            self,
            Self::HeaderIntersectionLeft
                | Self::HeaderIntersectionRight
                | Self::FooterIntersectionLeft
                | Self::FooterIntersectionRight
        )
    }

    /// Stacking layer: body 0, bands 1, corners 2.
    pub fn z_layer(self) -> u8 {
        match self {
            Self::Body => 0,
            _ if self.is_intersection() => 2,
            _ => 1,
        }
    }

    /// Whether the cell's column index is a body column (exposed as aria-colindex).
    pub fn exposes_col_index(self) -> bool {
        matches!(self, Self::Body | Self::ColumnHeader | Self::ColumnFooter)
    }

    /// Whether the cell's row index is a body row (exposed as aria-rowindex).
    pub fn exposes_row_index(self) -> bool {
        matches!(self, Self::Body | Self::RowHeader | Self::RowFooter)
    }
}

impl std::fmt::Display for CellRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
