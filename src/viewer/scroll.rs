//! Scroll-position controller.
//!
//! Owns the committed scroll offset, clamps every request to the content
//! bounds, and tracks two things the redraw loop needs: a dirty flag and
//! whether the user is actively scrolling. Time is passed in by the caller
//! (milliseconds on any monotonic clock) so the controller has no opinion on
//! where ticks come from.

use tracing::trace;

use crate::layout::{GridMetrics, Viewport};
use crate::types::{GridViewModel, Position};

/// Delay (ms) after the last scroll before settling back to idle.
pub const SCROLL_SETTLE_DELAY_MS: f64 = 100.0;

/// Idle, or scrolling until `settle_at_ms` passes without another scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollPhase {
    Idle,
    Scrolling { settle_at_ms: f64 },
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    viewport: Viewport,
    inner_width: f32,
    inner_height: f32,
    phase: ScrollPhase,
    dirty: bool,
    max_cells_while_scrolling: Option<usize>,
}

impl ScrollController {
    /// Controller for `viewport`, clamped to an `inner_width` x `inner_height`
    /// content area. Starts idle and dirty so the first tick draws.
    pub fn new(viewport: Viewport, inner_width: f32, inner_height: f32) -> Self {
        let mut controller = Self {
            viewport,
            inner_width,
            inner_height,
            phase: ScrollPhase::Idle,
            dirty: true,
            max_cells_while_scrolling: None,
        };
        let requested = viewport.scroll();
        let requested = if is_finite(requested) {
            requested
        } else {
            Position::default()
        };
        let clamped = controller.clamp(requested);
        controller.commit(clamped);
        controller
    }

    /// Controller sized and positioned from a view model
    pub fn for_model<T>(model: &GridViewModel<T>, metrics: &GridMetrics) -> Self {
        let mut viewport = Viewport::new(model.width, model.height, model.scrollbar_allowance());
        viewport.set_scroll(model.initial_scroll());
        let mut controller = Self::new(viewport, metrics.inner_width(), metrics.inner_height());
        controller.max_cells_while_scrolling = model.max_cells_while_scrolling;
        controller
    }

    pub fn offset(&self) -> Position {
        self.viewport.scroll()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.phase, ScrollPhase::Scrolling { .. })
    }

    pub fn settle_deadline(&self) -> Option<f64> {
        match self.phase {
            ScrollPhase::Idle => None,
            ScrollPhase::Scrolling { settle_at_ms } => Some(settle_at_ms),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Largest reachable offset on each axis
    pub fn max_scroll(&self) -> Position {
        self.viewport.max_scroll(self.inner_width, self.inner_height)
    }

    pub fn clamp(&self, target: Position) -> Position {
        self.viewport
            .clamp(target, self.inner_width, self.inner_height)
    }

    /// Body cell cap for the next frame: the configured cap while scrolling,
    /// unbounded when idle.
    pub fn max_cells(&self) -> Option<usize> {
        if self.is_scrolling() {
            self.max_cells_while_scrolling
        } else {
            None
        }
    }

    pub fn set_max_cells_while_scrolling(&mut self, max_cells: Option<usize>) {
        self.max_cells_while_scrolling = max_cells;
    }

    /// Scroll to an absolute target.
    ///
    /// Returns the new clamped offset when it differs from the current one;
    /// that also marks the controller dirty and (re)starts the settle timer.
    /// A target that clamps to the current offset is a no-op.
    pub fn scroll_to(&mut self, target: Position, now_ms: f64) -> Option<Position> {
        let clamped = self.clamp(target);
        if !self.commit(clamped) {
            return None;
        }
        self.phase = ScrollPhase::Scrolling {
            settle_at_ms: now_ms + SCROLL_SETTLE_DELAY_MS,
        };
        trace!(x = clamped.x, y = clamped.y, "scroll committed");
        Some(clamped)
    }

    /// Scroll by a wheel delta relative to the committed offset.
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32, now_ms: f64) -> Option<Position> {
        let current = self.offset();
        self.scroll_to(
            Position::new(current.x + delta_x, current.y + delta_y),
            now_ms,
        )
    }

    /// Settle to idle once the deadline has passed with no further scrolling.
    ///
    /// Settling marks the controller dirty so a full-detail frame replaces
    /// the capped one drawn while scrolling. Returns true on that transition.
    pub fn poll_settle(&mut self, now_ms: f64) -> bool {
        match self.phase {
            ScrollPhase::Scrolling { settle_at_ms } if now_ms >= settle_at_ms => {
                self.phase = ScrollPhase::Idle;
                self.dirty = true;
                trace!("scroll settled");
                true
            }
            _ => false,
        }
    }

    /// New content size. Re-clamps; returns the offset if it had to move.
    pub fn set_content_extent(&mut self, inner_width: f32, inner_height: f32) -> Option<Position> {
        self.inner_width = inner_width;
        self.inner_height = inner_height;
        self.dirty = true;
        self.reclamp()
    }

    /// New viewport size. Re-clamps; returns the offset if it had to move.
    pub fn set_viewport_size(
        &mut self,
        width: f32,
        height: f32,
        scrollbar_allowance: f32,
    ) -> Option<Position> {
        self.viewport.resize(width, height);
        self.viewport.scrollbar_allowance = scrollbar_allowance;
        self.dirty = true;
        self.reclamp()
    }

    fn reclamp(&mut self) -> Option<Position> {
        let clamped = self.clamp(self.offset());
        self.commit(clamped).then_some(clamped)
    }

    /// Store `offset`; true if it moved. Non-finite offsets are refused and
    /// a non-finite current offset always counts as moved.
    fn commit(&mut self, offset: Position) -> bool {
        if !is_finite(offset) {
            return false;
        }
        let current = self.offset();
        let moved = !is_finite(current)
            || (offset.x - current.x).abs() > f32::EPSILON
            || (offset.y - current.y).abs() > f32::EPSILON;
        if moved {
            self.viewport.set_scroll(offset);
            self.dirty = true;
        }
        moved
    }
}

fn is_finite(p: Position) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn controller() -> ScrollController {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 4000]);
        let metrics = GridMetrics::new(&model);
        let mut c = ScrollController::for_model(&model, &metrics);
        c.take_dirty();
        c
    }

    #[test]
    fn test_starts_idle_and_dirty() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 4000]);
        let metrics = GridMetrics::new(&model);
        let c = ScrollController::for_model(&model, &metrics);
        assert!(c.is_dirty());
        assert_eq!(c.phase(), ScrollPhase::Idle);
        assert_eq!(c.offset(), Position::new(0.0, 0.0));
    }

    #[test]
    fn test_initial_offset_is_clamped() {
        let mut model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 10]);
        model.x = 1e6;
        model.y = -40.0;
        let metrics = GridMetrics::new(&model);
        let c = ScrollController::for_model(&model, &metrics);
        assert_eq!(c.offset(), Position::new(6715.0, 0.0));
    }

    #[test]
    fn test_non_finite_offsets_never_stick() {
        let model = GridViewModel::<()>::new(800.0, 500.0, vec![75.0; 100], vec![30.0; 4000]);
        let metrics = GridMetrics::new(&model);
        let mut viewport = Viewport::new(800.0, 500.0, 15.0);
        viewport.set_scroll(Position::new(f32::NAN, 40.0));

        let mut c = ScrollController::new(viewport, metrics.inner_width(), metrics.inner_height());
        assert_eq!(c.offset(), Position::new(0.0, 0.0));
        assert!(c.take_dirty());

        assert_eq!(c.scroll_to(Position::new(f32::NAN, 10.0), 0.0), None);
        assert_eq!(c.scroll_by(0.0, f32::NAN, 0.0), None);
        assert_eq!(c.offset(), Position::new(0.0, 0.0));
        assert_eq!(c.scroll_to(Position::new(10.0, 20.0), 0.0), Some(Position::new(10.0, 20.0)));
    }

    #[test]
    fn test_scroll_marks_dirty_and_starts_timer() {
        let mut c = controller();
        let moved = c.scroll_to(Position::new(100.0, 200.0), 1000.0);
        assert_eq!(moved, Some(Position::new(100.0, 200.0)));
        assert!(c.is_dirty());
        assert_eq!(c.phase(), ScrollPhase::Scrolling { settle_at_ms: 1100.0 });
    }

    #[test]
    fn test_clamped_no_op_is_not_dirty() {
        let mut c = controller();
        assert_eq!(c.scroll_by(-10.0, -10.0, 0.0), None);
        assert!(!c.is_dirty());
        assert_eq!(c.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn test_repeated_overscroll_converges() {
        let mut c = controller();
        let first = c.scroll_by(5000.0, 0.0, 0.0);
        assert_eq!(first, Some(Position::new(5000.0, 0.0)));
        let second = c.scroll_by(5000.0, 0.0, 10.0);
        assert_eq!(second, Some(Position::new(6715.0, 0.0)));
        for t in 0..5 {
            assert_eq!(c.scroll_by(5000.0, 0.0, 20.0 + f64::from(t)), None);
            assert_eq!(c.offset().x, 6715.0);
        }
    }

    #[test]
    fn test_settle_after_delay() {
        let mut c = controller();
        c.scroll_to(Position::new(0.0, 300.0), 0.0);
        c.take_dirty();

        assert!(!c.poll_settle(50.0));
        assert!(c.is_scrolling());

        // Another scroll pushes the deadline out.
        c.scroll_by(0.0, 30.0, 80.0);
        c.take_dirty();
        assert!(!c.poll_settle(120.0));

        assert!(c.poll_settle(180.0));
        assert_eq!(c.phase(), ScrollPhase::Idle);
        assert!(c.take_dirty());
        assert!(!c.poll_settle(500.0));
    }

    #[test]
    fn test_cap_only_while_scrolling() {
        let mut c = controller();
        c.set_max_cells_while_scrolling(Some(50));
        assert_eq!(c.max_cells(), None);
        c.scroll_by(0.0, 10.0, 0.0);
        assert_eq!(c.max_cells(), Some(50));
        c.poll_settle(1000.0);
        assert_eq!(c.max_cells(), None);
    }

    #[test]
    fn test_shrinking_content_reclamps() {
        let mut c = controller();
        c.scroll_to(Position::new(0.0, 100_000.0), 0.0);
        let moved = c.set_content_extent(7500.0, 3000.0);
        assert_eq!(moved, Some(Position::new(0.0, 2515.0)));
        assert!(c.is_dirty());
    }

    #[test]
    fn test_growing_viewport_reclamps() {
        let mut c = controller();
        c.scroll_to(Position::new(6715.0, 0.0), 0.0);
        let moved = c.set_viewport_size(1000.0, 500.0, 15.0);
        assert_eq!(moved, Some(Position::new(6515.0, 0.0)));
    }
}
