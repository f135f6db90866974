//! # Core Type Definitions
//!
//! This module contains the shared types of the dlite planning engine:
//! - Vertex identity (`VertexId`)
//! - Directed edges reported by movers (`Edge`)
//! - Error types (`PlannerError`)
//!
//! ## Determinism Guarantees
//!
//! `VertexId` implements `Ord` so that every table keyed by it can be a
//! `BTreeMap` and every enumeration has a stable order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// VERTEX IDENTITY
// =============================================================================

/// Stable identity of a vertex in the external graph.
///
/// The planner never owns vertices. It only indexes its auxiliary state
/// (g, rhs, queue position) by this identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    /// Get the raw identity value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// A directed, cost-incurring edge `from -> to`.
///
/// Movers report edges whose cost changed since the last cycle. The planner
/// repairs the lookahead of `from`, the endpoint whose rhs depends on the
/// edge cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source vertex.
    pub from: VertexId,
    /// Target vertex.
    pub to: VertexId,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while planning.
///
/// - No silent failures
/// - Use `Result<T, PlannerError>` for fallible operations
/// - The engine never panics; every error is recoverable by the caller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// The start vertex has an infinite cost-to-goal estimate.
    #[error("No path exists from {from}")]
    NoPath {
        /// The vertex the agent is standing on.
        from: VertexId,
    },

    /// The vertex was not part of the vertex set at initialization.
    #[error("Unknown vertex: {0}")]
    UnknownVertex(VertexId),

    /// The vertex is already present in the open list.
    #[error("Vertex already queued: {0}")]
    AlreadyQueued(VertexId),

    /// An edge cost was negative or not a number.
    #[error("Invalid cost {cost} on edge {from} -> {to}")]
    InvalidCost {
        /// Source vertex.
        from: VertexId,
        /// Target vertex.
        to: VertexId,
        /// The rejected cost.
        cost: f64,
    },

    /// The requested move does not follow an edge out of the current start.
    #[error("{to} is not a successor of {from}")]
    NotAdjacent {
        /// Current start vertex.
        from: VertexId,
        /// Requested next vertex.
        to: VertexId,
    },

    /// A driving loop performed more moves than allowed.
    #[error("Step limit of {0} moves exceeded")]
    StepLimit(usize),
}

// =============================================================================
// TESTS
// =============================================================================
