//! # Synchronous Driving Loop
//!
//! Runs D*-Lite in its entirety against a [`Mover`]:
//!
//! ```text
//! while start != goal:
//!     next = Step()            // fails with NoPath
//!     mover.move_to(next)
//!     (cost, edges) = mover.changed_edges()
//!     Update(cost, edges)
//! ```
//!
//! The signal-driven variant lives in the application crate; it reuses
//! [`cycle`] so both loops perform the identical step/move/update sequence.

use crate::graph::Mover;
use crate::options::PlannerOptions;
use crate::session::Planner;
use crate::{PlannerError, VertexId};
use serde::{Deserialize, Serialize};

/// What a completed (or interrupted) run did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Every vertex the agent stood on, starting with the initial start.
    pub path: Vec<VertexId>,
    /// Sum of edge costs travelled, evaluated at the time of each move.
    pub cost: f64,
    /// Number of cycles whose update repaired the estimates.
    pub replans: usize,
}

impl RunReport {
    /// A report for an agent that has not moved yet.
    #[must_use]
    pub fn starting_at(start: VertexId) -> Self {
        Self {
            path: vec![start],
            cost: 0.0,
            replans: 0,
        }
    }

    /// Number of moves performed.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Perform one step/move/update cycle. Returns the vertex moved to.
pub fn cycle<G: Mover>(
    planner: &mut Planner<G>,
    report: &mut RunReport,
) -> Result<VertexId, PlannerError> {
    let from = planner.start();
    let next = planner.step()?;
    let cost = planner.edge_cost(from, next);

    planner.graph_mut().move_to(next);
    planner.advance(next)?;
    report.path.push(next);
    report.cost += cost;

    let changes = planner.graph_mut().changed_edges();
    if planner.apply(changes)? {
        report.replans += 1;
    }
    tracing::debug!(%from, to = %next, cost, "moved");
    Ok(next)
}

/// Drive an initialized planner until it reaches the goal.
pub fn run<G: Mover>(planner: &mut Planner<G>) -> Result<RunReport, PlannerError> {
    run_with_limit(planner, None)
}

/// Like [`run`], failing with [`PlannerError::StepLimit`] after `limit` moves.
pub fn run_with_limit<G: Mover>(
    planner: &mut Planner<G>,
    limit: Option<usize>,
) -> Result<RunReport, PlannerError> {
    let mut report = RunReport::starting_at(planner.start());
    run_into(planner, limit, &mut report)?;
    Ok(report)
}

/// Drive `planner` to the goal, recording into a caller-owned report.
///
/// On failure `report` still holds every move made before it.
pub fn run_into<G: Mover>(
    planner: &mut Planner<G>,
    limit: Option<usize>,
    report: &mut RunReport,
) -> Result<(), PlannerError> {
    while !planner.has_arrived() {
        if let Some(limit) = limit
            && report.moves() >= limit
        {
            return Err(PlannerError::StepLimit(limit));
        }
        cycle(planner, report)?;
    }
    tracing::info!(
        moves = report.moves(),
        cost = report.cost,
        replans = report.replans,
        "goal reached"
    );
    Ok(())
}

/// Initialize a planner and run it to completion.
pub fn dstar_lite<G: Mover>(
    start: VertexId,
    goal: VertexId,
    mover: G,
    options: PlannerOptions,
) -> Result<RunReport, PlannerError> {
    let mut planner = Planner::new(start, goal, mover, options)?;
    run(&mut planner)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Changes, Graph, PlanningGraph};

    fn v(id: u64) -> VertexId {
        VertexId(id)
    }

    /// A graph that blocks one edge the first time the agent reaches a vertex.
    struct Trap {
        graph: Graph,
        at: VertexId,
        trigger: VertexId,
        block: (VertexId, VertexId),
        sprung: bool,
    }

    impl PlanningGraph for Trap {
        fn vertices(&self) -> Vec<VertexId> {
            self.graph.vertices()
        }
        fn successors(&self, vertex: VertexId) -> Vec<VertexId> {
            self.graph.successors(vertex)
        }
        fn predecessors(&self, vertex: VertexId) -> Vec<VertexId> {
            self.graph.predecessors(vertex)
        }
        fn edge_cost(&self, from: VertexId, to: VertexId) -> f64 {
            self.graph.edge_cost(from, to)
        }
    }

    impl Mover for Trap {
        fn move_to(&mut self, vertex: VertexId) {
            self.at = vertex;
            if vertex == self.trigger && !self.sprung {
                self.sprung = true;
                let (from, to) = self.block;
                self.graph.set_edge(from, to, 100.0).expect("edge");
            }
        }
        fn changed_edges(&mut self) -> Changes {
            Changes::edges(self.graph.take_changes())
        }
    }

    fn trap() -> Trap {
        // 0 -> 1 -> 2 -> 3 (unit), detour 1 -> 4 -> 3 (cost 2 each)
        let mut graph = Graph::new();
        for i in 0..3 {
            graph.set_edge(v(i), v(i + 1), 1.0).expect("edge");
        }
        graph.set_edge(v(1), v(4), 2.0).expect("edge");
        graph.set_edge(v(4), v(3), 2.0).expect("edge");
        graph.mark_clean();
        Trap {
            graph,
            at: v(0),
            trigger: v(1),
            block: (v(2), v(3)),
            sprung: false,
        }
    }

    #[test]
    fn run_reaches_goal_on_static_graph() {
        let mut graph = Graph::new();
        for i in 0..3 {
            graph.set_edge(v(i), v(i + 1), 1.0).expect("edge");
        }
        let trap = Trap {
            graph,
            at: v(0),
            trigger: v(99),
            block: (v(0), v(1)),
            sprung: false,
        };
        let report = dstar_lite(v(0), v(3), trap, PlannerOptions::default()).expect("run");
        assert_eq!(report.path, vec![v(0), v(1), v(2), v(3)]);
        assert_eq!(report.moves(), 3);
        assert!((report.cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn run_detours_around_discovered_obstacle() {
        let mut planner = Planner::with_defaults(v(0), v(3), trap()).expect("init");
        let report = run(&mut planner).expect("run");

        assert_eq!(report.path, vec![v(0), v(1), v(4), v(3)]);
        assert!((report.cost - 5.0).abs() < 1e-9);
        assert_eq!(report.replans, 1);
        assert_eq!(planner.graph().at, v(3));
    }

    #[test]
    fn run_fails_without_path() {
        let mut graph = Graph::new();
        graph.set_edge(v(1), v(0), 1.0).expect("edge");
        let trap = Trap {
            graph,
            at: v(0),
            trigger: v(99),
            block: (v(0), v(1)),
            sprung: false,
        };
        let result = dstar_lite(v(0), v(1), trap, PlannerOptions::default());
        assert_eq!(result, Err(PlannerError::NoPath { from: v(0) }));
    }

    #[test]
    fn step_limit_stops_run() {
        let mut planner = Planner::with_defaults(v(0), v(3), trap()).expect("init");
        let result = run_with_limit(&mut planner, Some(1));
        assert_eq!(result, Err(PlannerError::StepLimit(1)));
        assert_eq!(planner.start(), v(1));
    }

    #[test]
    fn run_into_keeps_moves_made_before_failure() {
        let mut planner = Planner::with_defaults(v(0), v(3), trap()).expect("init");
        let mut report = RunReport::starting_at(v(0));

        let result = run_into(&mut planner, Some(2), &mut report);

        assert_eq!(result, Err(PlannerError::StepLimit(2)));
        assert_eq!(report.path, vec![v(0), v(1), v(4)]);
        assert_eq!(report.replans, 1);
    }
}
