//! # Search Engine
//!
//! The incremental search state of D*-Lite:
//! - `Estimates`: the `g` and `rhs` tables
//! - `SearchEngine`: tables + open list + cost models + `k_m`
//!
//! The engine does not own the graph or the agent position. Every operation
//! receives both, so the session decides when the world is consulted.
//!
//! ## Invariants
//! - A vertex is queued iff it is inconsistent (`|g - rhs| > epsilon`)
//! - `rhs[goal] == 0` for the whole session
//! - At quiescence the start is consistent and no queued key beats its key

use crate::graph::PlanningGraph;
use crate::options::CostModel;
use crate::queue::OpenList;
use crate::{Key, PlannerError, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ESTIMATE TABLES
// =============================================================================

/// The `g` (consistent estimate) and `rhs` (one-step lookahead) tables.
///
/// Both tables are sized to the vertex set at creation. Lookups of unknown
/// vertices read as +infinity, so dangling edges never shorten a path.
#[derive(Debug, Clone, Default)]
pub struct Estimates {
    g: BTreeMap<VertexId, f64>,
    rhs: BTreeMap<VertexId, f64>,
}

impl Estimates {
    /// Every vertex starts with `g = rhs = +infinity`.
    #[must_use]
    pub fn new(vertices: &[VertexId]) -> Self {
        let g: BTreeMap<_, _> = vertices.iter().map(|&v| (v, f64::INFINITY)).collect();
        let rhs = g.clone();
        Self { g, rhs }
    }

    /// Check if the vertex was part of the initial vertex set.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.g.contains_key(&vertex)
    }

    /// Number of tracked vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.g.len()
    }

    /// Check if no vertex is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.g.is_empty()
    }

    /// Current best consistent estimate.
    #[must_use]
    pub fn g(&self, vertex: VertexId) -> f64 {
        self.g.get(&vertex).copied().unwrap_or(f64::INFINITY)
    }

    /// Current one-step lookahead estimate.
    #[must_use]
    pub fn rhs(&self, vertex: VertexId) -> f64 {
        self.rhs.get(&vertex).copied().unwrap_or(f64::INFINITY)
    }

    fn set_g(&mut self, vertex: VertexId, value: f64) {
        if let Some(slot) = self.g.get_mut(&vertex) {
            *slot = value;
        }
    }

    fn set_rhs(&mut self, vertex: VertexId, value: f64) {
        if let Some(slot) = self.rhs.get_mut(&vertex) {
            *slot = value;
        }
    }

    /// `g == rhs` within `epsilon`. Two infinities are consistent.
    #[must_use]
    pub fn is_consistent(&self, vertex: VertexId, epsilon: f64) -> bool {
        let (g, rhs) = (self.g(vertex), self.rhs(vertex));
        if g.is_infinite() && rhs.is_infinite() {
            return true;
        }
        (g - rhs).abs() <= epsilon
    }

    /// Vertices that are currently inconsistent.
    pub fn inconsistent(&self, epsilon: f64) -> impl Iterator<Item = VertexId> + '_ {
        self.g
            .keys()
            .copied()
            .filter(move |&v| !self.is_consistent(v, epsilon))
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Cumulative work counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Vertices popped from the open list.
    pub expansions: u64,
    /// Pops whose key had gone stale and were requeued.
    pub requeues: u64,
    /// Over-consistent vertices locked in (`g = rhs`).
    pub lowers: u64,
    /// Under-consistent vertices invalidated (`g = +infinity`).
    pub raises: u64,
    /// Calls to vertex update.
    pub vertex_updates: u64,
    /// Completed repair loops.
    pub repairs: u64,
}

// =============================================================================
// SEARCH ENGINE
// =============================================================================

/// Owns the estimate tables, the open list, the cost models and `k_m`.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    estimates: Estimates,
    open: OpenList,
    cost: CostModel,
    heuristic: CostModel,
    goal: VertexId,
    k_m: f64,
    epsilon: f64,
    stats: SearchStats,
}

impl SearchEngine {
    /// Create tables for `vertices` with `rhs[goal] = 0`.
    ///
    /// The goal is not queued yet: its key depends on the start, see
    /// [`SearchEngine::seed`].
    #[must_use]
    pub fn new(
        vertices: &[VertexId],
        goal: VertexId,
        cost: CostModel,
        heuristic: CostModel,
        epsilon: f64,
    ) -> Self {
        let mut estimates = Estimates::new(vertices);
        estimates.set_rhs(goal, 0.0);
        Self {
            estimates,
            open: OpenList::new(),
            cost,
            heuristic,
            goal,
            k_m: 0.0,
            epsilon,
            stats: SearchStats::default(),
        }
    }

    /// Queue the goal, the only inconsistent vertex of a fresh engine.
    pub fn seed<G: PlanningGraph + ?Sized>(
        &mut self,
        graph: &G,
        start: VertexId,
    ) -> Result<(), PlannerError> {
        let key = self.calculate_key(graph, start, self.goal);
        self.open.push(self.goal, key)
    }

    /// The estimate tables.
    #[must_use]
    pub fn estimates(&self) -> &Estimates {
        &self.estimates
    }

    /// The open list.
    #[must_use]
    pub fn open_list(&self) -> &OpenList {
        &self.open
    }

    /// Accumulated heuristic bias.
    #[must_use]
    pub fn k_m(&self) -> f64 {
        self.k_m
    }

    /// Consistency tolerance.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Work counters.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Swap in a replacement edge cost function.
    pub fn set_cost(&mut self, cost: CostModel) {
        self.cost = cost;
    }

    /// Add the heuristic drift between two agent positions to `k_m`.
    pub fn accumulate_drift<G: PlanningGraph + ?Sized>(
        &mut self,
        graph: &G,
        last: VertexId,
        start: VertexId,
    ) {
        self.k_m += self.heuristic.estimate(graph, last, start);
    }

    /// Cost of the edge `from -> to` under the current cost model.
    pub fn edge_cost<G: PlanningGraph + ?Sized>(
        &self,
        graph: &G,
        from: VertexId,
        to: VertexId,
    ) -> f64 {
        self.cost.edge(graph, from, to)
    }

    /// Check if a vertex is consistent.
    #[must_use]
    pub fn is_consistent(&self, vertex: VertexId) -> bool {
        self.estimates.is_consistent(vertex, self.epsilon)
    }

    /// `(min(g, rhs) + h(start, v) + k_m, min(g, rhs))`
    pub fn calculate_key<G: PlanningGraph + ?Sized>(
        &self,
        graph: &G,
        start: VertexId,
        vertex: VertexId,
    ) -> Key {
        let best = self.estimates.g(vertex).min(self.estimates.rhs(vertex));
        Key::new(
            best + self.heuristic.estimate(graph, start, vertex) + self.k_m,
            best,
        )
    }

    /// `min over successors s of (c(v, s) + g[s])`, +infinity without successors.
    pub fn lookahead<G: PlanningGraph + ?Sized>(&self, graph: &G, vertex: VertexId) -> f64 {
        graph
            .successors(vertex)
            .into_iter()
            .map(|succ| self.edge_cost(graph, vertex, succ) + self.estimates.g(succ))
            .fold(f64::INFINITY, f64::min)
    }

    /// Recompute `rhs[v]` and restore the open-list membership invariant.
    pub fn update_vertex<G: PlanningGraph + ?Sized>(
        &mut self,
        graph: &G,
        start: VertexId,
        vertex: VertexId,
    ) -> Result<(), PlannerError> {
        if !self.estimates.contains(vertex) {
            tracing::trace!(%vertex, "skipping vertex outside the initial vertex set");
            return Ok(());
        }
        self.stats.vertex_updates += 1;

        if vertex != self.goal {
            let rhs = self.lookahead(graph, vertex);
            self.estimates.set_rhs(vertex, rhs);
        }

        if self.is_consistent(vertex) {
            self.open.remove(vertex);
        } else {
            let key = self.calculate_key(graph, start, vertex);
            if self.open.contains(vertex) {
                self.open.fix(vertex, key);
            } else {
                self.open.push(vertex, key)?;
            }
        }
        Ok(())
    }

    /// Repair estimates until the start is consistent and no queued key
    /// beats the start's key.
    pub fn compute_shortest_path<G: PlanningGraph + ?Sized>(
        &mut self,
        graph: &G,
        start: VertexId,
    ) -> Result<(), PlannerError> {
        let before = self.stats;

        loop {
            let start_key = self.calculate_key(graph, start, start);
            if !self.open.top_key().less(&start_key) && self.is_consistent(start) {
                break;
            }
            let Some(entry) = self.open.pop_min() else {
                break;
            };
            self.stats.expansions += 1;

            let vertex = entry.vertex;
            let fresh = self.calculate_key(graph, start, vertex);
            let (g, rhs) = (self.estimates.g(vertex), self.estimates.rhs(vertex));

            if entry.key.less(&fresh) {
                self.stats.requeues += 1;
                self.open.push(vertex, fresh)?;
            } else if g > rhs {
                self.stats.lowers += 1;
                self.estimates.set_g(vertex, rhs);
                for pred in graph.predecessors(vertex) {
                    self.update_vertex(graph, start, pred)?;
                }
            } else {
                self.stats.raises += 1;
                self.estimates.set_g(vertex, f64::INFINITY);
                self.update_vertex(graph, start, vertex)?;
                for pred in graph.predecessors(vertex) {
                    self.update_vertex(graph, start, pred)?;
                }
            }
        }

        self.stats.repairs += 1;
        tracing::debug!(
            %start,
            expansions = self.stats.expansions - before.expansions,
            lowers = self.stats.lowers - before.lowers,
            raises = self.stats.raises - before.raises,
            queued = self.open.len(),
            "repair loop finished"
        );
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
