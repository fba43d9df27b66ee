//! Rectangle-vs-viewport tests.

use serde::{Deserialize, Serialize};

/// The visible window in content space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Which way to move along one axis to get closer to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    /// Toward higher indices (+1)
    Forward,
    /// Toward lower indices (-1)
    Backward,
}

impl Heading {
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Search hint: where the viewport centre lies relative to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub x: Heading,
    pub y: Heading,
}

/// How the vertical visibility test treats the bottom edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalEdgeRule {
    /// `y <= bottom`, mirroring the horizontal test
    #[default]
    Symmetric,
    /// `y - height <= bottom`, which admits one extra row below the viewport
    Legacy,
}

/// A cell's geometry in content space plus its visibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    pub direction: Direction,
}

/// Whether the rect spans any part of the viewport horizontally.
pub fn overlaps_x(x: f32, width: f32, viewport: &ViewportRect) -> bool {
    x + width >= viewport.x && x <= viewport.x + viewport.width
}

/// Whether the rect spans any part of the viewport vertically.
pub fn overlaps_y(y: f32, height: f32, viewport: &ViewportRect, rule: VerticalEdgeRule) -> bool {
    let top_ok = y + height >= viewport.y;
    let bottom = viewport.y + viewport.height;
    let bottom_ok = match rule {
        VerticalEdgeRule::Symmetric => y <= bottom,
        VerticalEdgeRule::Legacy => y - height <= bottom,
    };
    top_ok && bottom_ok
}

/// Edges touching the viewport count as visible.
pub fn is_visible(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    viewport: &ViewportRect,
    rule: VerticalEdgeRule,
) -> bool {
    overlaps_x(x, width, viewport) && overlaps_y(y, height, viewport, rule)
}

/// Backward on an axis when the rect's leading edge lies past the viewport
/// centre on that axis, Forward otherwise. Never "none": callers that need to
/// know an axis is already aligned check [`overlaps_x`]/[`overlaps_y`].
pub fn direction(x: f32, y: f32, viewport: &ViewportRect) -> Direction {
    let heading = |pos: f32, center: f32| {
        if pos > center {
            Heading::Backward
        } else {
            Heading::Forward
        }
    };
    Direction {
        x: heading(x, viewport.center_x()),
        y: heading(y, viewport.center_y()),
    }
}

impl CellRect {
    /// Build a rect and classify it against `viewport`.
    pub fn classify(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        viewport: &ViewportRect,
        rule: VerticalEdgeRule,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            visible: is_visible(x, y, width, height, viewport, rule),
            direction: direction(x, y, viewport),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use test_case::test_case;

    const VP: ViewportRect = ViewportRect::new(100.0, 200.0, 800.0, 500.0);

    #[test_case(150.0, 250.0 ; "fully inside")]
    #[test_case(50.0, 250.0 ; "straddles left edge")]
    #[test_case(880.0, 250.0 ; "straddles right edge")]
    #[test_case(150.0, 180.0 ; "straddles top edge")]
    #[test_case(900.0, 250.0 ; "touches right edge")]
    fn test_visible(x: f32, y: f32) {
        assert!(is_visible(x, y, 75.0, 30.0, &VP, VerticalEdgeRule::Symmetric));
    }

    #[test_case(0.0, 250.0 ; "left of viewport")]
    #[test_case(1000.0, 250.0 ; "right of viewport")]
    #[test_case(150.0, 100.0 ; "above viewport")]
    #[test_case(150.0, 800.0 ; "below viewport")]
    fn test_not_visible(x: f32, y: f32) {
        assert!(!is_visible(x, y, 75.0, 30.0, &VP, VerticalEdgeRule::Symmetric));
        assert!(!is_visible(x, y, 75.0, 30.0, &VP, VerticalEdgeRule::Legacy));
    }

    #[test]
    fn test_legacy_rule_admits_row_below_bottom() {
        // Viewport bottom is at 700; a row starting at 710 is outside.
        assert!(!is_visible(150.0, 710.0, 75.0, 30.0, &VP, VerticalEdgeRule::Symmetric));
        assert!(is_visible(150.0, 710.0, 75.0, 30.0, &VP, VerticalEdgeRule::Legacy));
    }

    #[test]
    fn test_direction_points_toward_center() {
        // Centre is at (500, 450).
        let d = direction(0.0, 0.0, &VP);
        assert_eq!(d, Direction { x: Heading::Forward, y: Heading::Forward });
        let d = direction(5000.0, 5000.0, &VP);
        assert_eq!(d, Direction { x: Heading::Backward, y: Heading::Backward });
        let d = direction(5000.0, 0.0, &VP);
        assert_eq!(d.x.sign(), -1);
        assert_eq!(d.y.sign(), 1);
    }

    #[test]
    fn test_classify() {
        let rect = CellRect::classify(150.0, 250.0, 75.0, 30.0, &VP, VerticalEdgeRule::Symmetric);
        assert!(rect.visible);
        assert_eq!(rect.direction.x, Heading::Forward);
    }
}
