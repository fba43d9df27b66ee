//! Grid component tests
//!
//! Drives `PowerGrid` the way a host does: JSON view model in, ticks with a
//! timestamp, scroll and click input, frames out through a renderer.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use powergrid::render::RecordedFrame;
use powergrid::{
    CellCoord, CellRenderData, CellRenderer, CellRole, FrameOutcome, FrameParams, GridError,
    GridViewModel, Position, PowerGrid, RecordingRenderer, ResolveOptions, ScrollIntent,
    SearchBudget,
};

/// `cols` x `rows` body of 75 x 30 cells in a 800 x 500 viewport
fn body_json(cols: u32, rows: u32) -> Value {
    let cells: Vec<Vec<Value>> = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| json!({ "viewModel": format!("{r}:{c}") }))
                .collect()
        })
        .collect();
    json!({
        "width": 800,
        "height": 500,
        "colWidths": vec![75.0; cols as usize],
        "rowHeights": vec![30.0; rows as usize],
        "cells": cells,
    })
}

fn grid_from(json: &Value) -> PowerGrid<Value> {
    let model = GridViewModel::<Value>::from_json(&json.to_string()).unwrap();
    let mut grid = PowerGrid::new(model).unwrap();
    grid.attach();
    grid
}

fn last(renderer: &RecordingRenderer<Value>) -> &RecordedFrame<Value> {
    renderer.last_frame().unwrap()
}

// ============================================================================
// View model decoding
// ============================================================================

#[test]
fn test_json_defaults() {
    let model = GridViewModel::<Value>::from_json(&body_json(3, 2).to_string()).unwrap();
    assert_eq!(model.scrollbar_size, 15.0);
    assert!(!model.hide_scrollbars);
    assert_eq!(model.max_cells_while_scrolling, None);
    assert_eq!(model.cells.len(), 6);
    assert!(model.headers.is_none());
}

#[test]
fn test_json_bands_and_sparse_entries() {
    let json = json!({
        "width": 400,
        "height": 300,
        "hideScrollbars": true,
        "colWidths": [100, 100],
        "rowHeights": [30, 30, 30],
        "cells": [
            { "row": 0, "col": 0, "cell": { "viewModel": "a", "colspan": 2 } },
            { "row": 2, "col": 1, "cell": { "viewModel": "b", "renderer": "number" } }
        ],
        "headers": {
            "colHeader": { "heights": [40], "cells": [[{ "viewModel": "A" }, null]] },
            "rowHeader": { "widths": [50], "cells": [[{ "viewModel": 1 }], [null], [{ "viewModel": 3 }]] },
            "leftIntersections": [[{ "viewModel": "#" }]]
        }
    });
    let model = GridViewModel::<Value>::from_json(&json.to_string()).unwrap();

    assert_eq!(model.scrollbar_allowance(), 0.0);
    assert_eq!(model.cells.get(0, 0).unwrap().col_span(), 2);
    assert_eq!(
        model.cells.get(2, 1).unwrap().renderer.as_deref(),
        Some("number")
    );
    assert_eq!(model.column_header().unwrap().cells.len(), 1);
    assert_eq!(model.row_header().unwrap().cells.len(), 2);
    assert_eq!(model.headers.as_ref().unwrap().left_intersections.len(), 1);
}

#[test]
fn test_invalid_view_models_are_rejected() {
    let mut json = body_json(3, 2);
    json["rowHeights"] = json!([30, -1]);
    match GridViewModel::<Value>::from_json(&json.to_string()) {
        Err(GridError::InvalidViewModel(msg)) => assert!(msg.contains("rowHeights[1]")),
        other => panic!("expected InvalidViewModel, got {other:?}"),
    }

    let mut json = body_json(3, 2);
    json["cells"][0][2] = json!({ "viewModel": "x", "colspan": 2 });
    assert!(matches!(
        GridViewModel::<Value>::from_json(&json.to_string()),
        Err(GridError::OutOfBounds { anchor: 2, span: 2, len: 3 })
    ));

    assert!(matches!(
        GridViewModel::<Value>::from_json("{ \"width\": 1"),
        Err(GridError::Json(_))
    ));
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_first_frame() {
    let mut grid = grid_from(&body_json(100, 4000));
    let mut renderer = RecordingRenderer::new();

    assert_eq!(
        grid.tick(0.0, &mut renderer),
        FrameOutcome::Drawn {
            cells: 187,
            truncated: false
        }
    );
    let frame = last(&renderer);
    assert_eq!(frame.params.inner_width, 7500.0);
    assert_eq!(frame.params.inner_height, 120_000.0);
    assert_eq!(frame.params.viewport_width, 785.0);
    assert_eq!((frame.params.row_count, frame.params.col_count), (4000, 100));
    assert!(!frame.params.scrolling);
    assert!(!frame.params.degraded);
    assert_eq!(frame.cells[0].content, Some(json!("0:0")));
    assert_eq!(frame.cells[0].key, "gridcell-0-0");
}

#[test]
fn test_scroll_is_clamped_and_reported() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut grid = grid_from(&body_json(100, 4000));
    let sink = Rc::clone(&seen);
    grid.on_scroll(move |p| sink.borrow_mut().push(p));

    let moved = grid.scroll_to(Position::new(7500.0, 0.0), 0.0);
    assert_eq!(moved, Some(Position::new(6715.0, 0.0)));
    assert_eq!(grid.scroll_offset(), Position::new(6715.0, 0.0));
    assert_eq!(*seen.borrow(), vec![Position::new(6715.0, 0.0)]);

    let mut renderer = RecordingRenderer::new();
    grid.tick(5.0, &mut renderer);
    let range = last(&renderer).params.range.unwrap();
    assert_eq!(range.max_col, 99);
}

#[test]
fn test_low_detail_frames_while_scrolling() {
    let mut json = body_json(100, 4000);
    json["maxCellsWhileScrolling"] = json!(40);
    let mut grid = grid_from(&json);
    let mut renderer = RecordingRenderer::new();

    grid.tick(0.0, &mut renderer);
    grid.wheel(0.0, 15.0, 10.0);

    assert_eq!(
        grid.tick(16.0, &mut renderer),
        FrameOutcome::Drawn {
            cells: 40,
            truncated: true
        }
    );
    assert!(last(&renderer).params.scrolling);

    // Nothing new until the settle deadline passes.
    assert_eq!(grid.tick(50.0, &mut renderer), FrameOutcome::Skipped);

    assert_eq!(
        grid.tick(200.0, &mut renderer),
        FrameOutcome::Drawn {
            cells: 198,
            truncated: false
        }
    );
    assert!(!last(&renderer).params.scrolling);
    assert_eq!(renderer.frame_count(), 3);
}

#[test]
fn test_intents_from_another_thread() {
    let mut grid = grid_from(&body_json(100, 4000));
    let tx = grid.intent_sender();
    let handle = std::thread::spawn(move || {
        tx.send(ScrollIntent::ScrollTo(Position::new(0.0, 3000.0)))
            .unwrap();
        tx.send(ScrollIntent::ScrollBy { dx: 150.0, dy: 0.0 })
            .unwrap();
    });
    handle.join().unwrap();

    let mut renderer = RecordingRenderer::new();
    grid.tick(0.0, &mut renderer);
    assert_eq!(grid.scroll_offset(), Position::new(150.0, 3000.0));
    let range = last(&renderer).params.range.unwrap();
    assert_eq!((range.min_row, range.min_col), (99, 1));
}

#[test]
fn test_degraded_frame_reaches_renderer() {
    let model = GridViewModel::<Value>::from_json(&body_json(100, 4000).to_string()).unwrap();
    let mut grid = PowerGrid::new(model).unwrap().with_options(ResolveOptions {
        budget: SearchBudget::Fixed(1),
        ..ResolveOptions::default()
    });
    grid.attach();
    let mut renderer = RecordingRenderer::new();

    assert_eq!(grid.tick(0.0, &mut renderer), FrameOutcome::Degraded);
    let frame = last(&renderer);
    assert!(frame.params.degraded);
    assert!(frame.cells.is_empty());
    assert!(frame.params.range.is_none());
}

struct FailingRenderer {
    begun: usize,
}

impl CellRenderer<Value> for FailingRenderer {
    fn begin_frame(&mut self, _params: &FrameParams) -> powergrid::error::Result<()> {
        self.begun += 1;
        Ok(())
    }

    fn render_cell(&mut self, _cell: &CellRenderData<'_, Value>) -> powergrid::error::Result<()> {
        Err(GridError::Renderer("surface lost".into()))
    }
}

#[test]
fn test_renderer_errors_are_absorbed() {
    let mut grid = grid_from(&body_json(10, 10));
    let mut renderer = FailingRenderer { begun: 0 };
    assert_eq!(grid.tick(0.0, &mut renderer), FrameOutcome::Failed);
    assert_eq!(grid.last_outcome(), Some(FrameOutcome::Failed));
    assert_eq!(renderer.begun, 1);
    // The failed frame is not retried until something changes.
    assert_eq!(grid.tick(16.0, &mut renderer), FrameOutcome::Skipped);
}

#[test]
fn test_closure_renderer_sees_serializable_records() {
    let mut grid = grid_from(&body_json(3, 2));
    let mut records = Vec::new();
    let mut renderer =
        |cell: &CellRenderData<'_, Value>| records.push(serde_json::to_value(cell).unwrap());
    grid.tick(0.0, &mut renderer);

    assert_eq!(records.len(), 6);
    let second = &records[1];
    assert_eq!(second["role"], "body");
    assert_eq!(second["key"], "gridcell-0-1");
    assert_eq!(second["x"], 75.0);
    assert_eq!(second["ariaRowIndex"], 1);
    assert_eq!(second["ariaColIndex"], 2);
    assert_eq!(second["zIndex"], 0);
    assert_eq!(second["filler"], false);
    assert_eq!(second["content"], "0:1");
}

// ============================================================================
// Cadence
// ============================================================================

#[test]
fn test_detach_stops_drawing() {
    let mut grid = grid_from(&body_json(10, 10));
    let mut renderer = RecordingRenderer::new();
    grid.cadence_mut().schedule(42);
    assert_eq!(grid.detach(), Some(42));
    assert!(!grid.is_attached());

    grid.wheel(0.0, 30.0, 0.0);
    assert_eq!(grid.tick(16.0, &mut renderer), FrameOutcome::Skipped);
    assert_eq!(renderer.frame_count(), 0);

    grid.attach();
    assert!(matches!(
        grid.tick(32.0, &mut renderer),
        FrameOutcome::Drawn { .. }
    ));
}

// ============================================================================
// Clicks
// ============================================================================

#[test]
fn test_click_passthrough_and_hit_testing() {
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let mut grid = grid_from(&body_json(100, 4000));
    let sink = Rc::clone(&clicks);
    grid.on_cell_click(move |coord| sink.borrow_mut().push(coord));

    assert!(grid.click(12, 3));
    grid.scroll_to(Position::new(75.0, 300.0), 0.0);
    assert_eq!(grid.click_at(10.0, 10.0), Some(CellCoord::new(10, 1)));
    assert_eq!(grid.click_at(795.0, 10.0), None);

    assert_eq!(
        *clicks.borrow(),
        vec![CellCoord::new(12, 3), CellCoord::new(10, 1)]
    );
}

// ============================================================================
// Model changes
// ============================================================================

fn with_row_header(rows: u32) -> Value {
    let mut json = body_json(4, rows);
    let header_cells: Vec<Value> = (0..rows)
        .map(|r| json!([{ "viewModel": format!("row {r}") }]))
        .collect();
    json["headers"] = json!({
        "rowHeader": { "widths": [60], "cells": header_cells }
    });
    json
}

#[test]
fn test_remove_row_shifts_rows_up() {
    let mut grid = grid_from(&with_row_header(5));
    let mut renderer = RecordingRenderer::new();
    grid.tick(0.0, &mut renderer);
    assert_eq!(
        last(&renderer).with_role(CellRole::RowHeader).count(),
        5
    );

    grid.remove_row(0).unwrap();
    assert!(grid.is_dirty());
    assert_eq!(grid.metrics().num_rows(), 4);
    assert_eq!(grid.metrics().inner_height(), 120.0);

    grid.tick(16.0, &mut renderer);
    let frame = last(&renderer);
    let first_header = frame.with_role(CellRole::RowHeader).next().unwrap();
    assert_eq!(first_header.row, 0);
    assert_eq!(first_header.content, Some(json!("row 1")));
    let first_body = frame.with_role(CellRole::Body).next().unwrap();
    assert_eq!(first_body.content, Some(json!("1:0")));
    assert_eq!(frame.params.row_count, 4);

    assert!(matches!(
        grid.remove_row(10),
        Err(GridError::OutOfBounds { anchor: 10, .. })
    ));
}

#[test]
fn test_remove_row_inside_tall_cell_keeps_drawing() {
    let json = json!({
        "width": 800,
        "height": 500,
        "colWidths": [75, 75],
        "rowHeights": [30, 30],
        "cells": [
            [{ "viewModel": "tall", "rowspan": 2 }, { "viewModel": "b" }],
            [null, { "viewModel": "d" }]
        ]
    });
    let mut grid = grid_from(&json);
    let mut renderer = RecordingRenderer::new();
    grid.tick(0.0, &mut renderer);

    grid.remove_row(1).unwrap();
    grid.model().validate().unwrap();
    assert_eq!(grid.model().cells.get(0, 0).map(|c| c.row_span()), Some(1));

    let outcome = grid.tick(16.0, &mut renderer);
    assert!(matches!(outcome, FrameOutcome::Drawn { .. }), "got {outcome:?}");
    let frame = last(&renderer);
    let tall = frame.with_role(CellRole::Body).next().unwrap();
    assert_eq!(tall.content, Some(json!("tall")));
    assert_eq!(frame.with_role(CellRole::Body).count(), 2);
}

#[test]
fn test_non_finite_initial_scroll_is_rejected() {
    let mut model = GridViewModel::<Value>::from_json(&body_json(3, 3).to_string()).unwrap();
    model.x = f32::NAN;
    assert!(matches!(
        PowerGrid::new(model.clone()),
        Err(GridError::InvalidViewModel(_))
    ));

    let mut grid = grid_from(&body_json(3, 3));
    assert!(matches!(
        grid.set_view_model(model),
        Err(GridError::InvalidViewModel(_))
    ));
    assert_eq!(grid.scroll_offset(), Position::new(0.0, 0.0));
    let mut renderer = RecordingRenderer::new();
    assert!(matches!(grid.tick(0.0, &mut renderer), FrameOutcome::Drawn { .. }));
}

#[test]
fn test_smaller_view_model_reclamps_scroll() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut grid = grid_from(&body_json(100, 4000));
    let sink = Rc::clone(&seen);
    grid.on_scroll(move |p| sink.borrow_mut().push(p));
    grid.scroll_to(Position::new(0.0, 100_000.0), 0.0);

    let smaller = GridViewModel::<Value>::from_json(&body_json(100, 100).to_string()).unwrap();
    grid.set_view_model(smaller).unwrap();

    // 100 rows of 30px: 3000 - 500 + 15
    assert_eq!(grid.scroll_offset(), Position::new(0.0, 2515.0));
    assert_eq!(seen.borrow().last(), Some(&Position::new(0.0, 2515.0)));

    let mut renderer = RecordingRenderer::new();
    grid.tick(500.0, &mut renderer);
    assert_eq!(last(&renderer).params.range.unwrap().max_row, 99);
}
