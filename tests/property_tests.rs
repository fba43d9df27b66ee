//! Property tests for geometry, visibility, clamping and resolution
//!
//! Resolution is checked against a brute-force scan of every cell, so any
//! visible cell the search and range scan miss shows up as a failure.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use powergrid::layout::{compute_offsets, is_visible, resolve_extent, total_extent, Viewport};
use powergrid::{
    Cell, CellMatrix, CellRole, GridMetrics, GridViewModel, Position, ResolveOptions,
    ScrollController, VerticalEdgeRule, ViewportRect, ViewportResolver,
};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
}

fn sizes(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(1.0f32..200.0, 1..max_len)
}

fn dense(col_widths: Vec<f32>, row_heights: Vec<f32>, width: f32, height: f32) -> GridViewModel<()> {
    let rows = row_heights.len() as u32;
    let cols = col_widths.len() as u32;
    let cells: CellMatrix<()> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| ((r, c), Cell::new(()))))
        .collect();
    GridViewModel::new(width, height, col_widths, row_heights).with_cells(cells)
}

proptest! {
    #[test]
    fn offsets_step_by_sizes(sizes in sizes(80), base in 0.0f32..500.0) {
        let offsets = compute_offsets(&sizes, base);
        prop_assert_eq!(offsets.len(), sizes.len());
        prop_assert_eq!(offsets[0], base);
        for i in 1..offsets.len() {
            prop_assert!(offsets[i] > offsets[i - 1]);
            prop_assert_eq!(offsets[i], offsets[i - 1] + sizes[i - 1]);
        }
        let sum: f32 = sizes.iter().sum();
        prop_assert!(close(total_extent(&offsets, &sizes), base + sum));
    }

    #[test]
    fn span_extent_sums_consecutive_sizes(
        sizes in sizes(40),
        anchor in 0u32..50,
        span in 1u32..6,
    ) {
        let len = sizes.len();
        let result = resolve_extent(&sizes, anchor, span);
        let end = anchor as usize + span as usize;
        if end <= len {
            let expected: f32 = sizes[anchor as usize..end].iter().sum();
            prop_assert!(close(result.unwrap(), expected));
            if span == 1 {
                prop_assert_eq!(resolve_extent(&sizes, anchor, 1).unwrap(), sizes[anchor as usize]);
            }
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn visibility_inside_and_far_outside(
        vx in -1000.0f32..1000.0,
        vy in -1000.0f32..1000.0,
        w in 1.0f32..200.0,
        h in 1.0f32..200.0,
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
        gap in 0.5f32..100.0,
    ) {
        let vp = ViewportRect::new(vx, vy, 800.0, 500.0);
        for rule in [VerticalEdgeRule::Symmetric, VerticalEdgeRule::Legacy] {
            // Fully inside
            let x = vx + fx * (800.0 - w);
            let y = vy + fy * (500.0 - h);
            prop_assert!(is_visible(x, y, w, h, &vp, rule));

            // Beyond one edge by more than the rect's own extent
            prop_assert!(!is_visible(vx - 2.0 * w - gap, y, w, h, &vp, rule));
            prop_assert!(!is_visible(vx + 800.0 + w + gap, y, w, h, &vp, rule));
            prop_assert!(!is_visible(x, vy - 2.0 * h - gap, w, h, &vp, rule));
            prop_assert!(!is_visible(x, vy + 500.0 + h + gap, w, h, &vp, rule));
        }
    }

    #[test]
    fn clamping_is_idempotent(
        widths in sizes(40),
        heights in sizes(200),
        dx in -5000.0f32..5000.0,
        dy in -5000.0f32..5000.0,
    ) {
        let model = dense(widths, heights, 400.0, 300.0);
        let metrics = GridMetrics::new(&model);
        let mut controller = ScrollController::for_model(&model, &metrics);
        let max = controller.max_scroll();

        for step in 0..8 {
            controller.scroll_by(dx, dy, f64::from(step));
            let p = controller.offset();
            prop_assert!(p.x >= 0.0 && p.x <= max.x);
            prop_assert!(p.y >= 0.0 && p.y <= max.y);
        }

        // Overscrolling lands on the bound and stays there.
        let (far_x, far_y) = (dx.signum() * 1e9, dy.signum() * 1e9);
        controller.scroll_by(far_x, far_y, 100.0);
        let bound = controller.offset();
        prop_assert!(bound.x == 0.0 || bound.x == max.x);
        prop_assert!(bound.y == 0.0 || bound.y == max.y);
        prop_assert_eq!(controller.scroll_by(far_x, far_y, 200.0), None);
        prop_assert_eq!(controller.offset(), bound);
        prop_assert_eq!(controller.clamp(bound), bound);
        prop_assert_eq!(controller.clamp(Position::new(-1.0, -1.0)), Position::new(0.0, 0.0));
    }

    #[test]
    fn resolution_matches_brute_force(
        widths in sizes(30),
        heights in sizes(60),
        vw in 50.0f32..900.0,
        vh in 50.0f32..700.0,
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
    ) {
        let model = dense(widths, heights, vw, vh);
        let metrics = GridMetrics::new(&model);
        let allowance = model.scrollbar_allowance();
        let max = Viewport::new(vw, vh, allowance)
            .max_scroll(metrics.inner_width(), metrics.inner_height());
        let vp = ViewportRect::new(fx * max.x, fy * max.y, vw, vh);

        let frame = ViewportResolver::new(&model, &metrics, vp, ResolveOptions::default())
            .resolve()
            .unwrap();
        let range = frame.range.unwrap();
        let start = frame.start.unwrap();
        prop_assert!(range.contains(start.coord.row, start.coord.col));

        let emitted: BTreeSet<(u32, u32)> =
            frame.body().map(|c| (c.coord.row, c.coord.col)).collect();
        prop_assert!(emitted.iter().all(|&(r, c)| range.contains(r, c)));

        let mut expected = BTreeSet::new();
        for r in 0..metrics.num_rows() {
            for c in 0..metrics.num_cols() {
                let rect = metrics
                    .cell_rect(CellRole::Body, r, c, 1, 1, &vp, allowance, VerticalEdgeRule::Symmetric)
                    .unwrap();
                if rect.visible {
                    expected.insert((r, c));
                }
            }
        }
        prop_assert_eq!(emitted, expected);
    }

    #[test]
    fn cap_bounds_body_cells(
        widths in sizes(30),
        heights in sizes(60),
        cap in 0usize..200,
    ) {
        let model = dense(widths, heights, 600.0, 400.0);
        let metrics = GridMetrics::new(&model);
        let vp = ViewportRect::new(0.0, 0.0, 600.0, 400.0);
        let capped = ResolveOptions { max_cells: Some(cap), ..ResolveOptions::default() };

        let full = ViewportResolver::new(&model, &metrics, vp, ResolveOptions::default())
            .resolve()
            .unwrap();
        let frame = ViewportResolver::new(&model, &metrics, vp, capped).resolve().unwrap();

        prop_assert!(frame.body_count <= cap);
        prop_assert_eq!(frame.body_count, full.body_count.min(cap));
        prop_assert_eq!(frame.truncated, full.body_count > cap);
    }
}
