//! `PowerGrid` - the hosting component.
//!
//! Owns the view model, its cached metrics, the scroll controller and the
//! redraw cadence, and ties them together:
//! - Input (wheel, absolute scroll, intents from other threads) goes through
//!   the scroll controller, which clamps and marks the grid dirty
//! - Each tick settles the scroll state and, when dirty, resolves the
//!   viewport and hands the frame to a `CellRenderer`
//! - Clicks are passed through to the host with their body coordinate
//!
//! Nothing here returns a resolution error to the host: a frame that cannot
//! be resolved is logged and drawn empty with `FrameParams::degraded` set.

mod cadence;
mod scroll;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use cadence::{CadenceState, FrameCadence, FrameHandle};
pub use scroll::{ScrollController, ScrollPhase, SCROLL_SETTLE_DELAY_MS};
#[cfg(target_arch = "wasm32")]
pub use wasm::GridView;

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, error, warn};

use crate::error::Result;
use crate::layout::{GridMetrics, ResolveOptions, ViewportCells, ViewportResolver};
use crate::render::{CellRenderData, CellRenderer, FrameParams};
use crate::types::{CellCoord, GridViewModel, Position};

/// Scroll input delivered through [`PowerGrid::intent_sender`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollIntent {
    /// Absolute offset, as reported by a native scroll surface
    ScrollTo(Position),
    /// Relative wheel delta
    ScrollBy { dx: f32, dy: f32 },
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Detached, or nothing changed since the last frame
    Skipped,
    Drawn { cells: usize, truncated: bool },
    /// Resolution failed; an empty frame was drawn
    Degraded,
    /// The renderer reported an error part-way through the frame
    Failed,
}

type ScrollCallback = Box<dyn FnMut(Position)>;
type ClickCallback = Box<dyn FnMut(CellCoord)>;

pub struct PowerGrid<T> {
    model: GridViewModel<T>,
    metrics: GridMetrics,
    scroll: ScrollController,
    cadence: FrameCadence,
    options: ResolveOptions,
    on_scroll: Option<ScrollCallback>,
    on_cell_click: Option<ClickCallback>,
    intents: Sender<ScrollIntent>,
    inbox: Receiver<ScrollIntent>,
    last_outcome: Option<FrameOutcome>,
}

impl<T> PowerGrid<T> {
    /// Build a grid for `model`. The view model is validated; the initial
    /// `x`/`y` are clamped. The grid starts detached and dirty.
    pub fn new(model: GridViewModel<T>) -> Result<Self> {
        model.validate()?;
        let metrics = GridMetrics::new(&model);
        let scroll = ScrollController::for_model(&model, &metrics);
        let (intents, inbox) = mpsc::channel();
        debug!(
            rows = metrics.num_rows(),
            cols = metrics.num_cols(),
            inner_width = metrics.inner_width(),
            inner_height = metrics.inner_height(),
            "grid created"
        );
        Ok(Self {
            model,
            metrics,
            scroll,
            cadence: FrameCadence::new(),
            options: ResolveOptions::default(),
            on_scroll: None,
            on_cell_click: None,
            intents,
            inbox,
            last_outcome: None,
        })
    }

    /// Override the search budget and edge rule. `max_cells` is ignored;
    /// the scroll controller supplies the cap per frame.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &GridViewModel<T> {
        &self.model
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    pub fn scroll_controller(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn scroll_offset(&self) -> Position {
        self.scroll.offset()
    }

    pub fn is_dirty(&self) -> bool {
        self.scroll.is_dirty()
    }

    pub fn last_outcome(&self) -> Option<FrameOutcome> {
        self.last_outcome
    }

    pub fn on_scroll(&mut self, callback: impl FnMut(Position) + 'static) {
        self.on_scroll = Some(Box::new(callback));
    }

    pub fn on_cell_click(&mut self, callback: impl FnMut(CellCoord) + 'static) {
        self.on_cell_click = Some(Box::new(callback));
    }

    /// Sender for scroll input produced off the grid's thread. Intents are
    /// applied at the start of the next tick.
    pub fn intent_sender(&self) -> Sender<ScrollIntent> {
        self.intents.clone()
    }

    /// Replace the view model. The scroll offset is kept and re-clamped to
    /// the new content; the next tick redraws.
    pub fn set_view_model(&mut self, model: GridViewModel<T>) -> Result<()> {
        model.validate()?;
        self.model = model;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.metrics = GridMetrics::new(&self.model);
        self.scroll
            .set_max_cells_while_scrolling(self.model.max_cells_while_scrolling);
        let resized = self.scroll.set_viewport_size(
            self.model.width,
            self.model.height,
            self.model.scrollbar_allowance(),
        );
        let reclamped = self
            .scroll
            .set_content_extent(self.metrics.inner_width(), self.metrics.inner_height());
        if let Some(offset) = reclamped.or(resized) {
            self.notify_scroll(offset);
        }
    }

    /// Scroll to an absolute offset. Returns the committed offset if it
    /// changed; the scroll callback sees the same value.
    pub fn scroll_to(&mut self, target: Position, now_ms: f64) -> Option<Position> {
        let moved = self.scroll.scroll_to(target, now_ms);
        if let Some(offset) = moved {
            self.notify_scroll(offset);
        }
        moved
    }

    /// Scroll by a wheel delta.
    pub fn wheel(&mut self, delta_x: f32, delta_y: f32, now_ms: f64) -> Option<Position> {
        let moved = self.scroll.scroll_by(delta_x, delta_y, now_ms);
        if let Some(offset) = moved {
            self.notify_scroll(offset);
        }
        moved
    }

    pub fn apply(&mut self, intent: ScrollIntent, now_ms: f64) -> Option<Position> {
        match intent {
            ScrollIntent::ScrollTo(target) => self.scroll_to(target, now_ms),
            ScrollIntent::ScrollBy { dx, dy } => self.wheel(dx, dy, now_ms),
        }
    }

    fn notify_scroll(&mut self, offset: Position) {
        if let Some(callback) = self.on_scroll.as_mut() {
            callback(offset);
        }
    }

    /// Pass a click on body cell (`row`, `col`) to the host. Returns false
    /// when no click handler is registered.
    pub fn click(&mut self, row: u32, col: u32) -> bool {
        match self.on_cell_click.as_mut() {
            Some(callback) => {
                callback(CellCoord::new(row, col));
                true
            }
            None => false,
        }
    }

    /// Click at a viewport-relative point; resolves the body cell under it.
    pub fn click_at(&mut self, screen_x: f32, screen_y: f32) -> Option<CellCoord> {
        let coord = self.cell_at(screen_x, screen_y)?;
        self.click(coord.row, coord.col).then_some(coord)
    }

    /// Body cell under a viewport-relative point. Points over a pinned band
    /// or past the content hit nothing.
    pub fn cell_at(&self, screen_x: f32, screen_y: f32) -> Option<CellCoord> {
        let viewport = self.scroll.viewport();
        let allowance = viewport.scrollbar_allowance;
        let m = &self.metrics;
        let over_start = screen_x < m.total_row_header_width()
            || screen_y < m.total_col_header_height();
        let over_end = screen_x >= viewport.width - allowance - m.total_row_footer_width()
            || screen_y >= viewport.height - allowance - m.total_col_footer_height();
        if over_start || over_end {
            return None;
        }
        let (x, y) = viewport.to_content(screen_x, screen_y);
        if x >= m.inner_width() || y >= m.inner_height() {
            return None;
        }
        Some(CellCoord::new(m.row_at_y(y)?, m.col_at_x(x)?))
    }

    pub fn attach(&mut self) {
        self.cadence.attach();
        self.scroll.mark_dirty();
    }

    /// Stop drawing. Returns the outstanding frame request for the host to
    /// cancel.
    pub fn detach(&mut self) -> Option<FrameHandle> {
        self.cadence.detach()
    }

    pub fn is_attached(&self) -> bool {
        self.cadence.is_attached()
    }

    pub fn cadence_mut(&mut self) -> &mut FrameCadence {
        &mut self.cadence
    }

    /// One cadence tick: apply queued intents, settle the scroll state and
    /// redraw if anything changed.
    pub fn tick<R>(&mut self, now_ms: f64, renderer: &mut R) -> FrameOutcome
    where
        R: CellRenderer<T> + ?Sized,
    {
        if !self.cadence.tick() {
            return FrameOutcome::Skipped;
        }
        while let Ok(intent) = self.inbox.try_recv() {
            self.apply(intent, now_ms);
        }
        self.scroll.poll_settle(now_ms);
        if !self.scroll.take_dirty() {
            return FrameOutcome::Skipped;
        }
        let outcome = self.draw(renderer);
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Resolve the current viewport without drawing.
    pub fn resolve(&self) -> Result<ViewportCells<'_, T>> {
        self.resolver().resolve()
    }

    fn resolver(&self) -> ViewportResolver<'_, T> {
        let options = ResolveOptions {
            max_cells: self.scroll.max_cells(),
            ..self.options
        };
        ViewportResolver::new(
            &self.model,
            &self.metrics,
            self.scroll.viewport().rect(),
            options,
        )
    }

    /// Frame parameters for the current state.
    pub fn frame_params(&self, frame: &ViewportCells<'_, T>, degraded: bool) -> FrameParams {
        let (viewport_width, viewport_height) = self.model.content_viewport_size();
        FrameParams {
            scroll: self.scroll.offset(),
            width: self.model.width,
            height: self.model.height,
            viewport_width,
            viewport_height,
            inner_width: self.metrics.inner_width(),
            inner_height: self.metrics.inner_height(),
            row_count: self.metrics.num_rows(),
            col_count: self.metrics.num_cols(),
            range: frame.range,
            scrolling: self.scroll.is_scrolling(),
            degraded,
        }
    }

    /// Resolve and present one frame regardless of the dirty flag.
    pub fn draw<R>(&self, renderer: &mut R) -> FrameOutcome
    where
        R: CellRenderer<T> + ?Sized,
    {
        let (frame, degraded) = match self.resolve() {
            Ok(frame) => (frame, false),
            Err(err) if err.is_recoverable() => {
                warn!(%err, "drawing an empty viewport");
                (ViewportCells::empty(), true)
            }
            Err(err) => {
                error!(%err, "viewport resolution failed");
                (ViewportCells::empty(), true)
            }
        };
        let params = self.frame_params(&frame, degraded);

        if let Err(err) = present(renderer, &params, &frame) {
            error!(%err, "renderer failed");
            return FrameOutcome::Failed;
        }
        if degraded {
            FrameOutcome::Degraded
        } else {
            FrameOutcome::Drawn {
                cells: frame.len(),
                truncated: frame.truncated,
            }
        }
    }
}

impl<T: Clone> PowerGrid<T> {
    /// Remove a body row (and its header/footer rows), then relayout.
    ///
    /// The edit is made on a copy of the model and only committed once the
    /// shortened grid validates.
    pub fn remove_row(&mut self, row: u32) -> Result<()> {
        let mut model = self.model.clone();
        model.remove_row(row)?;
        model.validate()?;
        self.model = model;
        self.refresh();
        Ok(())
    }
}

fn present<T, R>(renderer: &mut R, params: &FrameParams, frame: &ViewportCells<'_, T>) -> Result<()>
where
    R: CellRenderer<T> + ?Sized,
{
    renderer.begin_frame(params)?;
    for cell in &frame.cells {
        renderer.render_cell(&CellRenderData::from(cell))?;
    }
    renderer.end_frame()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::render::RecordingRenderer;
    use crate::types::{Cell, CellMatrix};

    fn model() -> GridViewModel<u32> {
        let cells: CellMatrix<u32> = (0..4000u32)
            .flat_map(|r| (0..100u32).map(move |c| ((r, c), Cell::new(r * 100 + c))))
            .collect();
        GridViewModel::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 4000]).with_cells(cells)
    }

    #[test]
    fn test_detached_grid_does_not_draw() {
        let mut grid = PowerGrid::new(model()).unwrap();
        let mut renderer = RecordingRenderer::new();
        assert_eq!(grid.tick(0.0, &mut renderer), FrameOutcome::Skipped);
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn test_first_tick_draws_then_idles() {
        let mut grid = PowerGrid::new(model()).unwrap();
        grid.attach();
        let mut renderer = RecordingRenderer::new();
        assert_eq!(
            grid.tick(0.0, &mut renderer),
            FrameOutcome::Drawn {
                cells: 187,
                truncated: false
            }
        );
        assert_eq!(grid.tick(16.0, &mut renderer), FrameOutcome::Skipped);
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn test_scroll_callback_sees_clamped_offset() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut grid = PowerGrid::new(model()).unwrap();
        let sink = Rc::clone(&seen);
        grid.on_scroll(move |p| sink.borrow_mut().push(p));

        grid.scroll_to(Position::new(7500.0, 0.0), 0.0);
        grid.scroll_to(Position::new(7500.0, 0.0), 5.0);
        assert_eq!(*seen.borrow(), vec![Position::new(6715.0, 0.0)]);
    }

    #[test]
    fn test_intents_apply_on_tick() {
        let mut grid = PowerGrid::new(model()).unwrap();
        grid.attach();
        let tx = grid.intent_sender();
        std::thread::spawn(move || {
            tx.send(ScrollIntent::ScrollBy { dx: 0.0, dy: 300.0 }).unwrap();
        })
        .join()
        .unwrap();

        let mut renderer = RecordingRenderer::new();
        grid.tick(0.0, &mut renderer);
        assert_eq!(grid.scroll_offset(), Position::new(0.0, 300.0));
        let frame = renderer.last_frame().unwrap();
        assert!(frame.params.scrolling);
        // Row 9 ends exactly on the top edge and still counts as visible.
        assert_eq!(frame.params.range.unwrap().min_row, 9);
    }

    #[test]
    fn test_click_passthrough() {
        let clicked = Rc::new(RefCell::new(None));
        let mut grid = PowerGrid::new(model()).unwrap();
        assert!(!grid.click(1, 2));
        let sink = Rc::clone(&clicked);
        grid.on_cell_click(move |coord| *sink.borrow_mut() = Some(coord));
        assert!(grid.click(4, 7));
        assert_eq!(*clicked.borrow(), Some(CellCoord::new(4, 7)));
    }

    #[test]
    fn test_cell_at_follows_scroll() {
        let mut grid = PowerGrid::new(model()).unwrap();
        assert_eq!(grid.cell_at(80.0, 35.0), Some(CellCoord::new(1, 1)));
        grid.scroll_to(Position::new(150.0, 60.0), 0.0);
        assert_eq!(grid.cell_at(80.0, 35.0), Some(CellCoord::new(3, 3)));
        assert_eq!(grid.cell_at(790.0, 10.0), None);
    }
}
