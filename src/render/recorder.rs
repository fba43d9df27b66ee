//! A renderer that keeps what it was asked to draw.

use super::backend::{CellRenderData, CellRenderer, FrameParams};
use crate::error::Result;
use crate::types::CellRole;

/// Owned copy of one [`CellRenderData`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCell<T> {
    pub row: u32,
    pub col: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub role: CellRole,
    pub colspan: u32,
    pub rowspan: u32,
    pub key: String,
    pub content: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame<T> {
    pub params: FrameParams,
    pub cells: Vec<RecordedCell<T>>,
}

impl<T> RecordedFrame<T> {
    pub fn with_role(&self, role: CellRole) -> impl Iterator<Item = &RecordedCell<T>> {
        self.cells.iter().filter(move |c| c.role == role)
    }
}

/// Keeps every frame it draws, most recent last
#[derive(Debug, Clone)]
pub struct RecordingRenderer<T> {
    pub frames: Vec<RecordedFrame<T>>,
}

impl<T> Default for RecordingRenderer<T> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<T> RecordingRenderer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame<T>> {
        self.frames.last()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl<T: Clone> CellRenderer<T> for RecordingRenderer<T> {
    fn begin_frame(&mut self, params: &FrameParams) -> Result<()> {
        self.frames.push(RecordedFrame {
            params: *params,
            cells: Vec::new(),
        });
        Ok(())
    }

    fn render_cell(&mut self, cell: &CellRenderData<'_, T>) -> Result<()> {
        if let Some(frame) = self.frames.last_mut() {
            frame.cells.push(RecordedCell {
                row: cell.row,
                col: cell.col,
                x: cell.x,
                y: cell.y,
                width: cell.width,
                height: cell.height,
                role: cell.role,
                colspan: cell.colspan,
                rowspan: cell.rowspan,
                key: cell.key.clone(),
                content: cell.content.cloned(),
            });
        }
        Ok(())
    }
}
