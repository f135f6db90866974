//! # Graph Collaborators
//!
//! The planner does not own a graph representation. It consumes one through
//! the `PlanningGraph` trait, and the driving loops additionally consume a
//! `Mover` that applies moves and reports changed edges.
//!
//! This module also provides `Graph`, an in-memory weighted digraph with a
//! change journal. All data structures use `BTreeMap` for deterministic
//! ordering.

use crate::{Edge, PlannerError, VertexId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A caller-supplied cost or heuristic function.
pub type CostFn = Arc<dyn Fn(VertexId, VertexId) -> f64 + Send + Sync>;

/// Cost of a uniform-cost edge.
pub const UNIT_COST: f64 = 1.0;

// =============================================================================
// PLANNINGGRAPH TRAIT
// =============================================================================

/// The graph operations the planner needs.
///
/// The vertex set must be finite and is captured once when a planner is
/// created. Vertices added afterwards are never planned over.
pub trait PlanningGraph {
    /// Enumerate every vertex.
    fn vertices(&self) -> Vec<VertexId>;

    /// Targets of edges leaving `vertex`.
    fn successors(&self, vertex: VertexId) -> Vec<VertexId>;

    /// Sources of edges entering `vertex`.
    fn predecessors(&self, vertex: VertexId) -> Vec<VertexId>;

    /// The graph's declared edge cost. Defaults to a uniform unit cost.
    fn edge_cost(&self, _from: VertexId, _to: VertexId) -> f64 {
        UNIT_COST
    }

    /// The graph's declared heuristic. Defaults to the null heuristic, which
    /// degrades the search to uniform-cost behaviour.
    fn heuristic(&self, _from: VertexId, _to: VertexId) -> f64 {
        0.0
    }
}

// =============================================================================
// MOVER TRAIT
// =============================================================================

/// Edge changes observed since the previous cycle.
#[derive(Clone, Default)]
pub struct Changes {
    /// Replacement cost function. Ignored unless `edges` is non-empty.
    pub cost: Option<CostFn>,
    /// Edges whose cost changed.
    pub edges: Vec<Edge>,
}

impl Changes {
    /// No changes.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Changed edges, keeping the current cost function.
    #[must_use]
    pub fn edges(edges: Vec<Edge>) -> Self {
        Self { cost: None, edges }
    }

    /// Check if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl std::fmt::Debug for Changes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Changes")
            .field("cost", &self.cost.as_ref().map(|_| "<fn>"))
            .field("edges", &self.edges)
            .finish()
    }
}

/// The world an agent moves through.
///
/// `move_to` is assumed to update the world synchronously. It is always
/// followed by exactly one `changed_edges` call.
pub trait Mover: PlanningGraph {
    /// Move the agent to `vertex`.
    fn move_to(&mut self, vertex: VertexId);

    /// Report the edges whose cost changed since the last call.
    fn changed_edges(&mut self) -> Changes;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// An in-memory weighted digraph.
///
/// Every edge mutation is appended to a change journal which movers drain
/// with [`Graph::take_changes`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Vertex storage.
    vertices: BTreeSet<VertexId>,

    /// Adjacency list: from -> (to -> cost)
    out_edges: BTreeMap<VertexId, BTreeMap<VertexId, f64>>,

    /// Reverse adjacency: to -> {from}
    in_edges: BTreeMap<VertexId, BTreeSet<VertexId>>,

    /// Edges changed since the last drain.
    journal: BTreeSet<Edge>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex. Adding an existing vertex is a no-op.
    pub fn add_vertex(&mut self, vertex: VertexId) {
        self.vertices.insert(vertex);
    }

    /// Check if a vertex exists.
    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Insert an edge or change its cost. Missing endpoints are added.
    pub fn set_edge(&mut self, from: VertexId, to: VertexId, cost: f64) -> Result<(), PlannerError> {
        if cost.is_nan() || cost < 0.0 {
            return Err(PlannerError::InvalidCost { from, to, cost });
        }
        self.add_vertex(from);
        self.add_vertex(to);

        let previous = self.out_edges.entry(from).or_default().insert(to, cost);
        self.in_edges.entry(to).or_default().insert(from);
        if previous != Some(cost) {
            self.journal.insert(Edge::new(from, to));
        }
        Ok(())
    }

    /// Remove an edge. Returns its cost if it existed.
    pub fn remove_edge(&mut self, from: VertexId, to: VertexId) -> Option<f64> {
        let cost = self.out_edges.get_mut(&from)?.remove(&to)?;
        if let Some(sources) = self.in_edges.get_mut(&to) {
            sources.remove(&from);
        }
        self.journal.insert(Edge::new(from, to));
        Some(cost)
    }

    /// Cost of an edge, if present.
    #[must_use]
    pub fn cost(&self, from: VertexId, to: VertexId) -> Option<f64> {
        self.out_edges.get(&from)?.get(&to).copied()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_edges.values().map(BTreeMap::len).sum()
    }

    /// Drain the change journal.
    pub fn take_changes(&mut self) -> Vec<Edge> {
        std::mem::take(&mut self.journal).into_iter().collect()
    }

    /// Forget every change recorded so far.
    pub fn mark_clean(&mut self) {
        self.journal.clear();
    }
}

impl PlanningGraph for Graph {
    fn vertices(&self) -> Vec<VertexId> {
        self.vertices.iter().copied().collect()
    }

    fn successors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.out_edges
            .get(&vertex)
            .map(|targets| targets.keys().copied().collect())
            .unwrap_or_default()
    }

    fn predecessors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.in_edges
            .get(&vertex)
            .map(|sources| sources.iter().copied().collect())
            .unwrap_or_default()
    }

    fn edge_cost(&self, from: VertexId, to: VertexId) -> f64 {
        self.cost(from, to).unwrap_or(f64::INFINITY)
    }
}

// =============================================================================
// TESTS
// =============================================================================
