//! Data model shared by the layout engine and the viewer.

mod cell;
mod matrix;
mod role;
mod view_model;

pub use cell::{Cell, CellCoord, Position};
pub use matrix::CellMatrix;
pub use role::CellRole;
pub use view_model::{BandSet, ColumnBand, GridViewModel, RowBand, DEFAULT_SCROLLBAR_SIZE};
