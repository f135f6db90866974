//! # Planner Options
//!
//! Cost and heuristic functions are each independently optional. A missing
//! function falls back to the graph's declared capability, whose trait
//! default is the uniform unit cost (or the null heuristic). Resolution
//! happens once, when the planner is created.

use crate::VertexId;
use crate::graph::{CostFn, PlanningGraph};

/// Default tolerance for `g == rhs` consistency checks.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Construction options for a [`crate::Planner`].
#[derive(Clone)]
pub struct PlannerOptions {
    /// Edge cost override.
    pub cost: Option<CostFn>,
    /// Heuristic override. Must not overestimate for optimal paths.
    pub heuristic: Option<CostFn>,
    /// Consistency tolerance.
    pub epsilon: f64,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            cost: None,
            heuristic: None,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl PlannerOptions {
    /// Options that defer to the graph for everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-supplied edge cost.
    #[must_use]
    pub fn with_cost(mut self, cost: CostFn) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Use a caller-supplied heuristic.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: CostFn) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    /// Use a different consistency tolerance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl std::fmt::Debug for PlannerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerOptions")
            .field("cost", &self.cost.as_ref().map(|_| "<fn>"))
            .field("heuristic", &self.heuristic.as_ref().map(|_| "<fn>"))
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

// =============================================================================
// RESOLVED MODEL
// =============================================================================

/// A resolved cost or heuristic source.
#[derive(Clone)]
pub enum CostModel {
    /// Ask the graph ([`PlanningGraph::edge_cost`] or
    /// [`PlanningGraph::heuristic`]).
    Declared,
    /// A caller-supplied function.
    Custom(CostFn),
}

impl CostModel {
    /// Resolve an optional override.
    #[must_use]
    pub fn resolve(custom: Option<CostFn>) -> Self {
        custom.map_or(Self::Declared, Self::Custom)
    }

    /// Evaluate as an edge cost.
    pub fn edge<G: PlanningGraph + ?Sized>(&self, graph: &G, from: VertexId, to: VertexId) -> f64 {
        match self {
            Self::Declared => graph.edge_cost(from, to),
            Self::Custom(f) => f(from, to),
        }
    }

    /// Evaluate as a heuristic.
    pub fn estimate<G: PlanningGraph + ?Sized>(
        &self,
        graph: &G,
        from: VertexId,
        to: VertexId,
    ) -> f64 {
        match self {
            Self::Declared => graph.heuristic(from, to),
            Self::Custom(f) => f(from, to),
        }
    }

    /// Check if this model defers to the graph.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        matches!(self, Self::Declared)
    }
}

impl std::fmt::Debug for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declared => write!(f, "Declared"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
