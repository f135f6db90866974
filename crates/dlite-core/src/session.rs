//! # Session Module
//!
//! The externally visible planning session.
//!
//! A `Planner` owns the graph and the search engine, and tracks the agent's
//! `start`, the fixed `goal`, and `last` (the start as of the previous
//! replan). A typical cycle is:
//!
//! ```text
//! next = planner.step()?          // pure query
//! <agent moves to next>
//! planner.advance(next)?          // record the new position
//! planner.update(cost, &edges)?   // absorb changed edges, repair
//! ```
//!
//! ## Preconditions
//!
//! The vertex set is captured at construction. Vertices the graph gains
//! later are never planned over; `advance` to one is rejected.

use crate::engine::{Estimates, SearchEngine, SearchStats};
use crate::graph::{Changes, CostFn, PlanningGraph};
use crate::options::{CostModel, PlannerOptions};
use crate::{Edge, Key, PlannerError, VertexId};
use std::collections::{BTreeSet, VecDeque};

/// A D*-Lite planning session over a graph `G`.
#[derive(Debug)]
pub struct Planner<G> {
    graph: G,
    start: VertexId,
    goal: VertexId,
    last: VertexId,
    engine: SearchEngine,
    replans: usize,
}

impl<G: PlanningGraph> Planner<G> {
    /// Initialize a session and compute the first shortest path.
    ///
    /// Equivalent to `s_last = s_start; Initialize(); ComputeShortestPath()`.
    /// On return `g[start]` is the optimal cost, or +infinity if the goal is
    /// unreachable.
    pub fn new(
        start: VertexId,
        goal: VertexId,
        graph: G,
        options: PlannerOptions,
    ) -> Result<Self, PlannerError> {
        let vertices = graph.vertices();
        for endpoint in [start, goal] {
            if !vertices.contains(&endpoint) {
                return Err(PlannerError::UnknownVertex(endpoint));
            }
        }

        let mut engine = SearchEngine::new(
            &vertices,
            goal,
            CostModel::resolve(options.cost),
            CostModel::resolve(options.heuristic),
            options.epsilon,
        );
        engine.seed(&graph, start)?;
        engine.compute_shortest_path(&graph, start)?;

        tracing::info!(
            %start,
            %goal,
            vertices = vertices.len(),
            cost_to_goal = engine.estimates().g(start),
            "planner initialized"
        );

        Ok(Self {
            graph,
            start,
            goal,
            last: start,
            engine,
            replans: 0,
        })
    }

    /// Initialize with the graph's own cost and heuristic.
    pub fn with_defaults(start: VertexId, goal: VertexId, graph: G) -> Result<Self, PlannerError> {
        Self::new(start, goal, graph, PlannerOptions::default())
    }

    // =========================================================================
    // STEP / ADVANCE / UPDATE
    // =========================================================================

    /// Propose the next vertex to move to.
    ///
    /// Returns `start` when already at the goal. Among the successors of
    /// `start`, picks one minimizing `c(start, s) + g[s]`. Ties prefer a
    /// successor that lowers `g`, then the smallest `g`, then enumeration
    /// order; zero-cost plateaus are crossed toward their nearest exit.
    /// Never mutates state.
    pub fn step(&self) -> Result<VertexId, PlannerError> {
        if self.start == self.goal {
            return Ok(self.start);
        }
        if self.engine.estimates().g(self.start).is_infinite() {
            return Err(PlannerError::NoPath { from: self.start });
        }
        self.best_successor(self.start)
            .ok_or(PlannerError::NoPath { from: self.start })
    }

    /// Record that the agent now stands on `to`.
    ///
    /// `to` must be the current start or one of its successors.
    pub fn advance(&mut self, to: VertexId) -> Result<(), PlannerError> {
        if !self.engine.estimates().contains(to) {
            return Err(PlannerError::UnknownVertex(to));
        }
        if to != self.start && !self.graph.successors(self.start).contains(&to) {
            return Err(PlannerError::NotAdjacent {
                from: self.start,
                to,
            });
        }
        self.start = to;
        Ok(())
    }

    /// Absorb edge-cost changes and repair the estimates.
    ///
    /// A no-op when `changed` is empty, even if a new cost function is
    /// supplied (it is discarded). Otherwise swaps in `cost` if given,
    /// advances `k_m` by `h(last, start)`, updates the source vertex of every
    /// changed edge and runs the repair loop.
    pub fn update(&mut self, cost: Option<CostFn>, changed: &[Edge]) -> Result<(), PlannerError> {
        if changed.is_empty() {
            return Ok(());
        }

        if let Some(cost) = cost {
            self.engine.set_cost(CostModel::Custom(cost));
        }
        self.engine
            .accumulate_drift(&self.graph, self.last, self.start);
        self.last = self.start;

        for edge in changed {
            self.engine
                .update_vertex(&self.graph, self.start, edge.from)?;
        }
        self.engine.compute_shortest_path(&self.graph, self.start)?;
        self.replans += 1;

        tracing::info!(
            start = %self.start,
            changed = changed.len(),
            k_m = self.engine.k_m(),
            cost_to_goal = self.engine.estimates().g(self.start),
            "replanned"
        );
        Ok(())
    }

    /// [`Planner::update`] with a mover's report. Returns true if a repair ran.
    pub fn apply(&mut self, changes: Changes) -> Result<bool, PlannerError> {
        let repaired = !changes.is_empty();
        self.update(changes.cost, &changes.edges)?;
        Ok(repaired)
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Current agent position.
    #[must_use]
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// The target vertex.
    #[must_use]
    pub fn goal(&self) -> VertexId {
        self.goal
    }

    /// The start as of the last replan.
    #[must_use]
    pub fn last(&self) -> VertexId {
        self.last
    }

    /// Check if the agent stands on the goal.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.start == self.goal
    }

    /// Accumulated heuristic bias.
    #[must_use]
    pub fn k_m(&self) -> f64 {
        self.engine.k_m()
    }

    /// The `g` value of a vertex.
    #[must_use]
    pub fn g(&self, vertex: VertexId) -> f64 {
        self.engine.estimates().g(vertex)
    }

    /// The `rhs` value of a vertex.
    #[must_use]
    pub fn rhs(&self, vertex: VertexId) -> f64 {
        self.engine.estimates().rhs(vertex)
    }

    /// Check if `g == rhs` within epsilon.
    #[must_use]
    pub fn is_consistent(&self, vertex: VertexId) -> bool {
        self.engine.is_consistent(vertex)
    }

    /// The estimate tables.
    #[must_use]
    pub fn estimates(&self) -> &Estimates {
        self.engine.estimates()
    }

    /// Number of queued (inconsistent) vertices.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.engine.open_list().len()
    }

    /// Check if a vertex is queued.
    #[must_use]
    pub fn is_queued(&self, vertex: VertexId) -> bool {
        self.engine.open_list().contains(vertex)
    }

    /// Queued vertices and their keys, sorted by key.
    #[must_use]
    pub fn queued(&self) -> Vec<(VertexId, Key)> {
        let mut entries: Vec<_> = self
            .engine
            .open_list()
            .iter()
            .map(|e| (e.vertex, e.key))
            .collect();
        entries.sort_by(|a, b| a.1.compare(&b.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Cost of `from -> to` under the session's cost model.
    #[must_use]
    pub fn edge_cost(&self, from: VertexId, to: VertexId) -> f64 {
        self.engine.edge_cost(&self.graph, from, to)
    }

    /// Work counters.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.engine.stats()
    }

    /// Number of non-empty updates absorbed.
    #[must_use]
    pub fn replans(&self) -> usize {
        self.replans
    }

    /// The planned path from `start` to `goal` under current estimates.
    ///
    /// Follows the step rule from vertex to vertex. `None` if the goal is
    /// unreachable or the descent revisits a vertex.
    #[must_use]
    pub fn path(&self) -> Option<Vec<VertexId>> {
        let mut current = self.start;
        let mut path = vec![current];
        let mut visited = BTreeSet::from([current]);

        while current != self.goal {
            if self.g(current).is_infinite() {
                return None;
            }
            current = self.best_successor(current)?;
            if !visited.insert(current) {
                return None;
            }
            path.push(current);
        }
        Some(path)
    }

    /// The owned graph.
    #[must_use]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Mutable access to the owned graph. Cost changes made here are only
    /// seen by the estimates after a matching [`Planner::update`].
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// Consume the session, returning the graph.
    pub fn into_graph(self) -> G {
        self.graph
    }

    /// The vertex the step rule moves to from `from`.
    ///
    /// Candidates are the successors minimizing `c(from, s) + g[s]`. A
    /// candidate that lowers `g` (or is the goal) wins, smallest `g` first.
    /// Otherwise every candidate lies on a zero-cost plateau of equal `g`;
    /// the first hop of the shortest tie-only route to a plateau vertex that
    /// can leave it is taken, so repeated steps never cycle.
    fn best_successor(&self, from: VertexId) -> Option<VertexId> {
        let candidates = self.candidates(from);
        let first = candidates.first()?;
        if first.1 {
            return Some(first.0);
        }

        let mut visited = BTreeSet::from([from]);
        let mut frontier: VecDeque<(VertexId, VertexId)> =
            candidates.iter().map(|&(s, _)| (s, s)).collect();
        while let Some((vertex, hop)) = frontier.pop_front() {
            if !visited.insert(vertex) {
                continue;
            }
            let onward = self.candidates(vertex);
            if onward.first().is_some_and(|c| c.1) {
                return Some(hop);
            }
            frontier.extend(onward.into_iter().map(|(s, _)| (s, hop)));
        }

        candidates
            .iter()
            .find(|c| c.0 != from)
            .map(|c| c.0)
    }

    /// Successors of `from` tied for the minimal `c + g`, each flagged with
    /// whether moving there lowers `g`. Lowering candidates come first, then
    /// ascending `g`, then enumeration order.
    fn candidates(&self, from: VertexId) -> Vec<(VertexId, bool)> {
        let epsilon = self.engine.epsilon();
        let scored: Vec<(VertexId, f64, f64)> = self
            .graph
            .successors(from)
            .into_iter()
            .map(|succ| {
                let g = self.g(succ);
                (succ, self.edge_cost(from, succ) + g, g)
            })
            .collect();
        let best = scored.iter().map(|e| e.1).fold(f64::INFINITY, f64::min);
        if best.is_infinite() {
            return Vec::new();
        }

        let mut ties: Vec<(VertexId, bool, f64)> = scored
            .into_iter()
            .filter(|e| e.1 - best <= epsilon)
            .map(|(succ, _, g)| (succ, succ == self.goal || g < best - epsilon, g))
            .collect();
        ties.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)));
        ties.into_iter().map(|(succ, lowers, _)| (succ, lowers)).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
