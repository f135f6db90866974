//! # Replanning Benchmarks
//!
//! Incremental repair versus planning from scratch after a single cost
//! change.
//!
//! Run with: `cargo bench -p dlite-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dlite_core::{Graph, Planner, PlannerOptions, VertexId};
use std::hint::black_box;
use std::sync::Arc;

/// A 4-connected `side x side` grid with unit costs.
fn create_grid(side: u64) -> Graph {
    let mut graph = Graph::new();
    let id = |x: u64, y: u64| VertexId(y * side + x);

    for y in 0..side {
        for x in 0..side {
            if x + 1 < side {
                graph.set_edge(id(x, y), id(x + 1, y), 1.0).expect("edge");
                graph.set_edge(id(x + 1, y), id(x, y), 1.0).expect("edge");
            }
            if y + 1 < side {
                graph.set_edge(id(x, y), id(x, y + 1), 1.0).expect("edge");
                graph.set_edge(id(x, y + 1), id(x, y), 1.0).expect("edge");
            }
        }
    }
    graph.mark_clean();
    graph
}

/// Manhattan distance on the grid.
fn manhattan(side: u64) -> PlannerOptions {
    PlannerOptions::new().with_heuristic(Arc::new(move |a: VertexId, b: VertexId| {
        let (ax, ay) = (a.value() % side, a.value() / side);
        let (bx, by) = (b.value() % side, b.value() / side);
        (ax.abs_diff(bx) + ay.abs_diff(by)) as f64
    }))
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_initial_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_plan");

    for side in [10u64, 30, 60].iter() {
        let graph = create_grid(*side);
        let goal = VertexId(side * side - 1);
        group.bench_with_input(BenchmarkId::from_parameter(side), side, |b, &side| {
            b.iter(|| {
                let planner =
                    Planner::new(VertexId(0), goal, graph.clone(), manhattan(side)).expect("init");
                black_box(planner.g(VertexId(0)))
            });
        });
    }

    group.finish();
}

fn bench_replan_vs_scratch(c: &mut Criterion) {
    let mut group = c.benchmark_group("replan_after_block");

    for side in [10u64, 30, 60].iter() {
        let goal = VertexId(side * side - 1);
        let mut base = Planner::new(VertexId(0), goal, create_grid(*side), manhattan(*side))
            .expect("init");
        let next = base.step().expect("step");
        base.advance(next).expect("advance");

        // Block the planned next edge out of the agent's cell.
        let after = base.step().expect("step");

        group.bench_with_input(BenchmarkId::new("incremental", side), side, |b, _| {
            b.iter_batched(
                || {
                    let mut planner = Planner::new(
                        VertexId(0),
                        goal,
                        create_grid(*side),
                        manhattan(*side),
                    )
                    .expect("init");
                    planner.advance(next).expect("advance");
                    planner
                },
                |mut planner| {
                    let graph = planner.graph_mut();
                    graph.set_edge(next, after, 1000.0).expect("block");
                    let changes = graph.take_changes();
                    planner.update(None, &changes).expect("update");
                    black_box(planner.step().ok())
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("scratch", side), side, |b, &side| {
            let mut graph = create_grid(side);
            graph.set_edge(next, after, 1000.0).expect("block");
            b.iter(|| {
                let planner = Planner::new(next, goal, graph.clone(), manhattan(side)).expect("init");
                black_box(planner.step().ok())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_initial_plan, bench_replan_vs_scratch);
criterion_main!(benches);
