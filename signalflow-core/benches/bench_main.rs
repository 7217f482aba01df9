//! Route search benchmarks on square grids of junctions.
//!
//! Run with: cargo bench -p signalflow_core

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use signalflow_core::prelude::*;

fn start_of_day() -> Timestamp {
    NaiveDate::from_ymd_opt(2025, 2, 13)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid timestamp")
}

fn junction_name(row: usize, col: usize) -> String {
    format!("J{row}-{col}")
}

/// `size` x `size` junctions; neighbors share one road segment.
/// The middle row is congested.
fn grid_network(size: usize, search: PathSearch) -> TrafficModel {
    let now = start_of_day();
    let mut config = TrafficConfig::default();
    config.routing.search = search;
    let mut model = TrafficModel::with_config(config).expect("valid config");

    let horizontal = |r: usize, c: usize| format!("h{r}-{c}");
    let vertical = |r: usize, c: usize| format!("v{r}-{c}");

    for r in 0..size {
        for c in 0..size {
            if c + 1 < size {
                model.create_road(&horizontal(r, c), now).expect("road");
            }
            if r + 1 < size {
                model.create_road(&vertical(r, c), now).expect("road");
            }
        }
    }

    for r in 0..size {
        for c in 0..size {
            let mut roads = Vec::new();
            if c > 0 {
                roads.push(horizontal(r, c - 1));
            }
            if c + 1 < size {
                roads.push(horizontal(r, c));
            }
            if r > 0 {
                roads.push(vertical(r - 1, c));
            }
            if r + 1 < size {
                roads.push(vertical(r, c));
            }
            model
                .create_junction(&junction_name(r, c), &roads, now)
                .expect("junction");
        }
    }

    let middle = size / 2;
    for c in 0..size {
        for _ in 0..7 {
            model
                .record_traffic(&junction_name(middle, c), now)
                .expect("traffic");
        }
    }

    model
}

fn bench_alternate_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("alternate_routes");
    let now = start_of_day();

    for size in [4, 6] {
        for (label, search) in [("naive", PathSearch::Naive), ("yen", PathSearch::Yen)] {
            let model = grid_network(size, search);
            let start = junction_name(0, 0);
            let end = junction_name(size - 1, size - 1);

            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    model
                        .alternate_routes(black_box(&start), black_box(&end), now)
                        .expect("known junctions")
                });
            });
        }
    }

    group.finish();
}

fn bench_predict_congestion(c: &mut Criterion) {
    let model = grid_network(6, PathSearch::Naive);
    let now = start_of_day();
    let name = junction_name(3, 3);

    c.bench_function("predict_congestion", |b| {
        b.iter(|| {
            model
                .predict_congestion(black_box(&name), now)
                .expect("known junction")
        });
    });
}

criterion_group!(benches, bench_alternate_routes, bench_predict_congestion);
criterion_main!(benches);
