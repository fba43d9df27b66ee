use serde::{Deserialize, Serialize};

/// A single cell anchored at some (row, col) of a matrix.
///
/// The anchor coordinate is not stored on the cell; it is the key the cell
/// lives under in its [`CellMatrix`](super::CellMatrix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell<T> {
    /// Number of columns the cell covers (>= 1)
    #[serde(default = "default_span")]
    pub colspan: u32,
    /// Number of rows the cell covers (>= 1)
    #[serde(default = "default_span")]
    pub rowspan: u32,
    /// Opaque key the host uses to pick a drawing routine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Role-specific content handed to the renderer untouched
    #[serde(rename = "viewModel")]
    pub content: T,
}

fn default_span() -> u32 {
    1
}

impl<T> Cell<T> {
    /// A 1x1 cell with no renderer key.
    pub fn new(content: T) -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            renderer: None,
            content,
        }
    }

    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    pub fn with_rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan.max(1);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Column span, treating a zero from hand-written JSON as 1.
    pub fn col_span(&self) -> u32 {
        self.colspan.max(1)
    }

    /// Row span, treating a zero from hand-written JSON as 1.
    pub fn row_span(&self) -> u32 {
        self.rowspan.max(1)
    }
}

/// Matrix coordinate of a cell (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl From<(u32, u32)> for CellCoord {
    fn from((row, col): (u32, u32)) -> Self {
        Self { row, col }
    }
}

/// A scroll offset or point in content space (pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
