//! Core Error Types
//!
//! Defines the error taxonomy shared across the Query Pilot workspace.
//! These error types only depend on thiserror and serde so the core crate
//! stays lightweight. The application crate adds its own `AppError` for
//! configuration, storage and network failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons the policy gate declines a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyError {
    /// A non-read statement was submitted while DDL/DML is disabled.
    #[error("Only SELECT statements are allowed when DDL/DML is disabled.")]
    NotAuthorized,

    /// The statement matched one of the deny-list pattern classes.
    #[error("Query contains forbidden patterns ({pattern}).")]
    ForbiddenPattern {
        /// Name of the matched pattern class
        pattern: String,
    },
}

/// Failures raised while running a statement against the database.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum ExecutionError {
    /// No open connection to execute against.
    #[error("No active connection to the database.")]
    ConnectionMissing,

    /// The driver rejected or failed the statement.
    #[error("Database execution error: {0}")]
    DriverFailure(String),

    /// Anything else, e.g. no pooled connection became free in time.
    #[error("General execution error: {0}")]
    Other(String),
}

impl ExecutionError {
    /// Create a driver failure
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::DriverFailure(msg.into())
    }

    /// Create an uncategorised failure
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Conditions reported by the analysis orchestrator.
///
/// `EmptyResponse` is soft: the orchestrator still records a placeholder entry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisError {
    /// There is no executed read statement to analyze.
    #[error("No query context available for analysis.")]
    MissingContext,

    /// The language model returned nothing usable.
    #[error("Empty response from the language model.")]
    EmptyResponse,
}

/// Failures building a chart from a result table.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ChartError {
    /// No visualization result is loaded.
    #[error("No visualization data available. Execute a query first.")]
    MissingResult,

    /// A selected column does not exist in the result.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The chart kind needs a field the request did not provide.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A column that must be aggregated holds non-numeric values.
    #[error("Column '{0}' must contain numeric values")]
    NonNumeric(String),
}
