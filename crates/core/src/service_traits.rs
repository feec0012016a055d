//! Collaborator Traits
//!
//! The three external services the pipeline talks to: the database driver,
//! the language model and the chart renderer. Concrete implementations live
//! in the application crate; tests substitute in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartArtifact, ChartRequest};
use crate::error::{ChartError, ExecutionError};
use crate::table::Table;

/// Connection details submitted from the connection form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Driver-specific target (file path, DSN, ...)
    pub target: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Never serialized back to the frontend.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }
}

/// Result of a committed mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSummary {
    pub affected_rows: u64,
}

/// A statement the driver observed running slowly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowStatement {
    pub sql_text: String,
    pub elapsed_ms: u64,
    pub executions: u64,
}

/// Database driver used by the dispatcher.
///
/// All calls are synchronous and never retried.
pub trait Database: Send + Sync {
    /// Open a connection. Any failure is reported as `false`, never raised.
    fn connect(&mut self, credentials: &Credentials) -> bool;

    /// Whether a connection is currently open.
    fn is_connected(&self) -> bool;

    /// Run a read statement and return its rows.
    fn execute_read(&self, sql: &str) -> Result<Table, ExecutionError>;

    /// Run a mutating statement and commit it.
    fn execute_mutation(&self, sql: &str) -> Result<MutationSummary, ExecutionError>;

    /// Column metadata for the table a statement reads from, if it can be found.
    fn table_metadata(&self, sql: &str) -> Option<Table>;

    /// Statements that exceeded the driver's slow-statement threshold.
    fn performance_data(&self) -> Vec<SlowStatement> {
        Vec::new()
    }

    /// Close the connection. Idempotent.
    fn close(&mut self);
}

/// Language model used for SQL generation and analysis.
///
/// `None` always means "no result"; implementations log their own failures.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for display.
    fn model(&self) -> &str;

    /// Translate a natural-language request into SQL.
    async fn generate_sql(&self, natural_language: &str) -> Option<String>;

    /// Answer a free-form analysis prompt.
    async fn analyze(&self, prompt: &str) -> Option<String>;

    /// Suggest optimisations for a statement.
    async fn optimize_sql(&self, sql: &str) -> Option<String>;
}

/// Chart renderer used by the visualization sub-thread.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, request: &ChartRequest, table: &Table) -> Result<ChartArtifact, ChartError>;
}
