//! # dlite-core
//!
//! The incremental replanning engine for dlite - THE LOGIC.
//!
//! This crate implements D*-Lite: a shortest-path search over a graph whose
//! edge costs may change between planning steps. After an initial search it
//! keeps two estimates per vertex (`g`, `rhs`) and an open list of the
//! vertices where they disagree, so a cost change only re-expands the
//! vertices whose estimates it actually affects.
//!
//! ## Layout
//!
//! - `key` / `queue`: the lexicographic priority key and the indexed open list
//! - `engine`: estimate tables, vertex update and the repair loop
//! - `session`: the `Planner` (`step`, `advance`, `update`)
//! - `graph`: the `PlanningGraph` / `Mover` collaborators and an in-memory `Graph`
//! - `drive`: the synchronous step/move/update loop
//!
//! ## Architectural Constraints
//!
//! - NO async, NO I/O: the signal-driven loop lives in the application crate
//! - The vertex set is fixed when a planner is created
//! - One planner serves one agent; it is not meant to be shared across
//!   concurrent planning cycles

// =============================================================================
// MODULES
// =============================================================================

pub mod drive;
pub mod engine;
pub mod graph;
pub mod key;
pub mod options;
pub mod queue;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use key::Key;
pub use types::{Edge, PlannerError, VertexId};

// =============================================================================
// RE-EXPORTS: Planning Engine
// =============================================================================

pub use drive::{RunReport, cycle, dstar_lite, run, run_into, run_with_limit};
pub use engine::{Estimates, SearchEngine, SearchStats};
pub use graph::{Changes, CostFn, Graph, Mover, PlanningGraph, UNIT_COST};
pub use options::{CostModel, DEFAULT_EPSILON, PlannerOptions};
pub use queue::{Entry, OpenList};
pub use session::Planner;
