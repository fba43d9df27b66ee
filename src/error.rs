//! Structured error types for powergrid.
//!
//! Empty axes and absent cells are ordinary control flow and never show up
//! here. Everything else a resolution pass can hit is one of these variants.

/// All errors that can occur while building metrics or resolving a viewport.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A span reaches past the end of its axis table. The view model is
    /// malformed; retrying will not help.
    #[error("span of {span} starting at {anchor} exceeds axis length {len}")]
    OutOfBounds { anchor: u32, span: u32, len: usize },

    /// The start-cell search ran out of iterations without landing on a
    /// visible cell. Callers render an empty viewport and wait for the next
    /// scroll or resize.
    #[error("no visible cell found after {iterations} iterations")]
    NoVisibleCellFound { iterations: usize },

    /// The view model failed validation.
    #[error("Invalid view model: {0}")]
    InvalidViewModel(String),

    /// The host renderer rejected a frame or a cell.
    #[error("Renderer: {0}")]
    Renderer(String),

    /// JSON view model could not be decoded.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    /// True for conditions a host should absorb by drawing an empty frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoVisibleCellFound { .. })
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
