//! Benchmarks for viewport resolution.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use powergrid::layout::{expand_range, locate_start_cell, BodyProbe, SearchBudget};
use powergrid::{
    Cell, CellMatrix, GridMetrics, GridViewModel, ResolveOptions, VerticalEdgeRule, ViewportRect,
    ViewportResolver,
};

fn dense_model(rows: u32, cols: u32) -> GridViewModel<u32> {
    let cells: CellMatrix<u32> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| ((r, c), Cell::new(r.wrapping_mul(cols) + c))))
        .collect();
    GridViewModel::new(
        800.0,
        500.0,
        vec![75.0; cols as usize],
        vec![30.0; rows as usize],
    )
    .with_cells(cells)
}

/// Full resolution at a few scroll positions on a 100 x 4000 grid
fn bench_resolve(c: &mut Criterion) {
    let model = dense_model(4000, 100);
    let metrics = GridMetrics::new(&model);
    let mut group = c.benchmark_group("resolve_100x4000");

    for (name, x, y) in [
        ("top_left", 0.0, 0.0),
        ("middle", 3000.0, 60_000.0),
        ("bottom_right", 6715.0, 119_515.0),
    ] {
        let viewport = ViewportRect::new(x, y, 800.0, 500.0);
        group.bench_with_input(BenchmarkId::from_parameter(name), &viewport, |b, vp| {
            b.iter(|| {
                let resolver =
                    ViewportResolver::new(&model, &metrics, *vp, ResolveOptions::default());
                black_box(resolver.resolve().expect("resolve"))
            })
        });
    }
    group.finish();
}

/// Start-cell search plus range scan only, as the grid grows
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for rows in [1_000u32, 10_000, 100_000] {
        let model = dense_model(rows, 50);
        let metrics = GridMetrics::new(&model);
        let y = rows as f32 * 30.0 * 0.37;
        let probe = BodyProbe {
            metrics: &metrics,
            cells: &model.cells,
            viewport: ViewportRect::new(1200.0, y, 800.0, 500.0),
            allowance: model.scrollbar_allowance(),
            rule: VerticalEdgeRule::default(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(rows), &probe, |b, probe| {
            b.iter(|| {
                let start = locate_start_cell(probe, SearchBudget::Auto).expect("start cell");
                black_box(expand_range(probe, start.coord).expect("range"))
            })
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let model = dense_model(100_000, 50);
    c.bench_function("metrics_100k_rows", |b| {
        b.iter(|| GridMetrics::new(black_box(&model)))
    });
}

criterion_group!(benches, bench_resolve, bench_search, bench_metrics);
criterion_main!(benches);
