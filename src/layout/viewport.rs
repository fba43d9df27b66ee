//! Viewport state: scroll offset, size and scroll bounds.

use super::visibility::ViewportRect;
use crate::types::Position;

/// Viewport state - the visible window onto the grid content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_x: f32,
    /// Vertical scroll position in content coordinates
    pub scroll_y: f32,
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
    /// Extra scroll room reserved for native scrollbars
    pub scrollbar_allowance: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 0.0)
    }
}

impl Viewport {
    /// Create a viewport scrolled to the origin
    pub fn new(width: f32, height: f32, scrollbar_allowance: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
            scrollbar_allowance,
        }
    }

    pub fn scroll(&self) -> Position {
        Position::new(self.scroll_x, self.scroll_y)
    }

    /// The visible window in content space
    pub fn rect(&self) -> ViewportRect {
        ViewportRect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// Convert viewport coordinates to content coordinates
    pub fn to_content(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }

    /// Largest scroll offset on each axis.
    ///
    /// `inner - viewport + allowance`, never below zero so content smaller
    /// than the viewport does not scroll at all.
    pub fn max_scroll(&self, inner_width: f32, inner_height: f32) -> Position {
        Position::new(
            (inner_width - self.width + self.scrollbar_allowance).max(0.0),
            (inner_height - self.height + self.scrollbar_allowance).max(0.0),
        )
    }

    /// Clamp `target` into `[0, max_scroll]` on both axes.
    pub fn clamp(&self, target: Position, inner_width: f32, inner_height: f32) -> Position {
        let max = self.max_scroll(inner_width, inner_height);
        Position::new(target.x.clamp(0.0, max.x), target.y.clamp(0.0, max.y))
    }

    /// Move to `offset` as given; callers clamp first.
    pub fn set_scroll(&mut self, offset: Position) {
        self.scroll_x = offset.x;
        self.scroll_y = offset.y;
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::layout::GridMetrics;
    use crate::types::GridViewModel;

    fn metrics() -> GridMetrics {
        GridMetrics::new(&GridViewModel::<()>::new(
            800.0,
            500.0,
            vec![75.0; 100],
            vec![30.0; 4000],
        ))
    }

    fn clamp_in(vp: &Viewport, metrics: &GridMetrics, x: f32, y: f32) -> Position {
        vp.clamp(Position::new(x, y), metrics.inner_width(), metrics.inner_height())
    }

    #[test]
    fn test_clamp_to_far_edge() {
        let vp = Viewport::new(800.0, 500.0, 15.0);
        let clamped = clamp_in(&vp, &metrics(), 7500.0, 1e9);
        assert_eq!(clamped.x, 7500.0 - 800.0 + 15.0);
        assert_eq!(clamped.y, 120_000.0 - 500.0 + 15.0);
    }

    #[test]
    fn test_clamp_negative_to_zero() {
        let vp = Viewport::new(800.0, 500.0, 15.0);
        assert_eq!(clamp_in(&vp, &metrics(), -50.0, -1.0), Position::new(0.0, 0.0));
    }

    #[test]
    fn test_small_content_does_not_scroll() {
        let small = GridMetrics::new(&GridViewModel::<()>::new(
            800.0,
            500.0,
            vec![75.0; 2],
            vec![30.0; 2],
        ));
        let vp = Viewport::new(800.0, 500.0, 15.0);
        assert_eq!(vp.max_scroll(small.inner_width(), small.inner_height()), Position::new(0.0, 0.0));
        assert_eq!(clamp_in(&vp, &small, 100.0, 100.0), Position::new(0.0, 0.0));
    }

    #[test]
    fn test_to_content_adds_scroll() {
        let mut vp = Viewport::new(800.0, 500.0, 0.0);
        vp.set_scroll(Position::new(120.0, 45.0));
        assert_eq!(vp.to_content(80.0, 55.0), (200.0, 100.0));
        assert_eq!(vp.rect(), ViewportRect::new(120.0, 45.0, 800.0, 500.0));
    }
}
