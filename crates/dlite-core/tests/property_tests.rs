//! # Property-Based Tests
//!
//! Invariants of the incremental search, checked with proptest against a
//! from-scratch Dijkstra on the same graph.

use dlite_core::{Edge, Graph, Planner, PlannerError, PlannerOptions, PlanningGraph, VertexId};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// =============================================================================
// HELPERS
// =============================================================================

/// Build a graph with vertices `0..n` and the given `(from, to, cost)` edges.
fn build(n: u64, edges: &[(u64, u64, u8)]) -> Graph {
    let mut graph = Graph::new();
    for i in 0..n {
        graph.add_vertex(VertexId(i));
    }
    for &(from, to, cost) in edges {
        graph
            .set_edge(VertexId(from % n), VertexId(to % n), f64::from(cost))
            .expect("edge");
    }
    graph.mark_clean();
    graph
}

/// Reference single-shot search: cost from `start` to `goal`, if reachable.
fn dijkstra(graph: &Graph, start: VertexId, goal: VertexId) -> Option<f64> {
    let mut dist: BTreeMap<VertexId, f64> = BTreeMap::new();
    let mut done = BTreeSet::new();
    dist.insert(start, 0.0);

    loop {
        let current = dist
            .iter()
            .filter(|(v, _)| !done.contains(*v))
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(v, d)| (*v, *d));
        let (vertex, d) = current?;
        if vertex == goal {
            return Some(d);
        }
        done.insert(vertex);
        for succ in graph.successors(vertex) {
            let candidate = d + graph.edge_cost(vertex, succ);
            if dist.get(&succ).is_none_or(|&old| candidate < old) {
                dist.insert(succ, candidate);
            }
        }
    }
}

/// Cost of the path the planner would walk right now.
fn planned_cost(planner: &Planner<Graph>) -> Option<f64> {
    let path = planner.path()?;
    Some(
        path.windows(2)
            .map(|pair| planner.graph().edge_cost(pair[0], pair[1]))
            .sum(),
    )
}

/// Admissible and consistent for edge costs of at least 1.
fn unit_hop(from: VertexId, to: VertexId) -> f64 {
    if from == to { 0.0 } else { 1.0 }
}

/// `unit_hop` when every edge costs at least 1, the null heuristic otherwise.
fn options_for(edges: &[(u64, u64, u8)], informed: bool) -> PlannerOptions {
    if informed && edges.iter().all(|&(_, _, cost)| cost >= 1) {
        PlannerOptions::new().with_heuristic(Arc::new(unit_hop))
    } else {
        PlannerOptions::new()
    }
}

/// Costs include 0, so zero-cost plateaus show up.
fn edges_strategy() -> impl Strategy<Value = Vec<(u64, u64, u8)>> {
    vec((0u64..16, 0u64..16, 0u8..10), 0..60)
}

/// After a repair: exactly the inconsistent vertices are queued, the start
/// is consistent and the goal is pinned at 0.
fn check_quiescent(planner: &Planner<Graph>, n: u64) -> Result<(), TestCaseError> {
    let goal = planner.goal();
    prop_assert!(planner.g(goal).abs() < 1e-12);
    prop_assert!(planner.rhs(goal).abs() < 1e-12);
    prop_assert!(planner.is_consistent(planner.start()));
    for i in 0..n {
        let vertex = VertexId(i);
        prop_assert_eq!(planner.is_queued(vertex), !planner.is_consistent(vertex));
    }
    Ok(())
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Walking the initial plan costs exactly what Dijkstra finds.
    #[test]
    fn static_plan_matches_dijkstra(
        n in 2u64..16,
        edges in edges_strategy(),
        start in 0u64..16,
        goal in 0u64..16,
        informed in any::<bool>(),
    ) {
        let graph = build(n, &edges);
        let (start, goal) = (VertexId(start % n), VertexId(goal % n));
        let expected = dijkstra(&graph, start, goal);

        let planner = Planner::new(start, goal, graph, options_for(&edges, informed)).expect("init");

        match expected {
            Some(cost) => {
                let walked = planned_cost(&planner).expect("path");
                prop_assert!((walked - cost).abs() < 1e-6, "walked {} expected {}", walked, cost);
                prop_assert!((planner.g(start) - cost).abs() < 1e-6);
            }
            None => {
                prop_assert_eq!(planner.step(), Err(PlannerError::NoPath { from: start }));
                prop_assert!(planner.path().is_none());
            }
        }
    }

    /// A vertex is queued iff it is inconsistent, and the goal is pinned at 0.
    #[test]
    fn queue_tracks_exactly_the_inconsistent_vertices(
        n in 2u64..16,
        edges in edges_strategy(),
        start in 0u64..16,
        goal in 0u64..16,
    ) {
        let graph = build(n, &edges);
        let (start, goal) = (VertexId(start % n), VertexId(goal % n));
        let planner = Planner::with_defaults(start, goal, graph).expect("init");
        check_quiescent(&planner, n)?;
    }

    /// Update without changed edges leaves every piece of state untouched.
    #[test]
    fn empty_update_is_a_noop(
        n in 2u64..16,
        edges in edges_strategy(),
        goal in 0u64..16,
    ) {
        let graph = build(n, &edges);
        let goal = VertexId(goal % n);
        let mut planner = Planner::with_defaults(VertexId(0), goal, graph).expect("init");
        if let Ok(next) = planner.step() {
            planner.advance(next).expect("advance");
        }

        let queued = planner.queued();
        let tables: Vec<_> = (0..n).map(|i| (planner.g(VertexId(i)), planner.rhs(VertexId(i)))).collect();
        let (k_m, last, stats) = (planner.k_m(), planner.last(), planner.stats());

        planner.update(Some(Arc::new(|_: VertexId, _: VertexId| 1000.0)), &[]).expect("update");
        planner.update(None, &[]).expect("update");

        let after: Vec<_> = (0..n).map(|i| (planner.g(VertexId(i)), planner.rhs(VertexId(i)))).collect();
        prop_assert_eq!(planner.queued(), queued);
        prop_assert_eq!(after, tables);
        prop_assert_eq!(planner.k_m().to_bits(), k_m.to_bits());
        prop_assert_eq!(planner.last(), last);
        prop_assert_eq!(planner.stats(), stats);
    }

    /// k_m never decreases under a non-negative heuristic.
    #[test]
    fn k_m_is_monotonic(
        n in 2u64..16,
        edges in edges_strategy(),
        goal in 0u64..16,
        raises in vec((0u64..16, 0u64..16, 1u8..20), 1..8),
    ) {
        let graph = build(n, &edges);
        let goal = VertexId(goal % n);
        let mut planner = Planner::new(VertexId(0), goal, graph, options_for(&edges, true)).expect("init");

        let mut previous = planner.k_m();
        for (from, to, cost) in raises {
            if let Ok(next) = planner.step() {
                planner.advance(next).expect("advance");
            }
            let graph = planner.graph_mut();
            graph.set_edge(VertexId(from % n), VertexId(to % n), f64::from(cost)).expect("edge");
            let changes = graph.take_changes();
            planner.update(None, &changes).expect("update");

            prop_assert!(planner.k_m() >= previous);
            check_quiescent(&planner, n)?;
            previous = planner.k_m();
        }
    }

    /// After raising an edge on the current plan, the repaired plan costs
    /// what a fresh search on the new graph finds.
    #[test]
    fn replanning_matches_fresh_search(
        n in 3u64..16,
        edges in edges_strategy(),
        goal in 1u64..16,
        pick in any::<prop::sample::Index>(),
        bump in 1u8..50,
        informed in any::<bool>(),
    ) {
        let graph = build(n, &edges);
        let goal = VertexId(goal % n);
        let mut planner = Planner::new(VertexId(0), goal, graph, options_for(&edges, informed)).expect("init");
        let Some(path) = planner.path() else {
            return Ok(());
        };
        if path.len() < 2 {
            return Ok(());
        }

        // Walk one step, then raise an edge somewhere on the remaining plan.
        let next = planner.step().expect("step");
        planner.advance(next).expect("advance");
        let edge_index = pick.index(path.len() - 1);
        let edge = Edge::new(path[edge_index], path[edge_index + 1]);
        let old = planner.graph().edge_cost(edge.from, edge.to);

        let graph = planner.graph_mut();
        graph.set_edge(edge.from, edge.to, old + f64::from(bump)).expect("raise");
        let changes = graph.take_changes();
        planner.update(None, &changes).expect("update");
        check_quiescent(&planner, n)?;

        let expected = dijkstra(planner.graph(), planner.start(), goal);
        match expected {
            Some(cost) => {
                let walked = planned_cost(&planner).expect("path");
                prop_assert!((walked - cost).abs() < 1e-6, "walked {} expected {}", walked, cost);
            }
            None => prop_assert!(planner.step().is_err()),
        }
    }
}
