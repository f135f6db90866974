//! # dlite
//!
//! The dlite application: a grid world the planner walks through, TOML
//! scenario files, a signal-driven planning service and the CLI.
//!
//! All planning logic lives in `dlite-core`. This crate only decides when a
//! cycle runs and what the agent discovers after each move.

pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod world;

pub use error::{AppError, Result};
