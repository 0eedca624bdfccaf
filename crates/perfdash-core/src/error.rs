//! Error types for dashboard operations.
//!
//! This module defines [`DashboardError`] which covers every failure the engine
//! can surface: range validation, collaborator failures (time-series store,
//! entity directory, result cache), cancellation and fan-out task failures.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while computing dashboard data.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A date range whose start lies after its end.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Requested start of the range.
        from: NaiveDate,
        /// Requested end of the range.
        to: NaiveDate,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested entity does not exist.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The time-series store failed to serve a request.
    #[error("Time-series store error: {0}")]
    Store(String),

    /// The entity directory failed to serve a lookup.
    #[error("Directory error: {0}")]
    Directory(String),

    /// Error interacting with the result cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// A fan-out task panicked or was aborted unexpectedly.
    #[error("Task failed: {0}")]
    Task(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`DashboardError`].
pub type Result<T> = std::result::Result<T, DashboardError>;
