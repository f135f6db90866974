//! Error types for the dlite application.

use dlite_core::PlannerError;
use thiserror::Error;

/// Application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The planning engine refused an operation.
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scenario file is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The planning service stopped without reporting an outcome.
    #[error("Planning service terminated unexpectedly")]
    ServiceLost,

    /// Output could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
