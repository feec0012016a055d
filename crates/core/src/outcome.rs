//! Execution Outcomes
//!
//! The tagged result of one dispatch attempt. The session state store consumes
//! these; every consumer matches all variants.

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, PolicyError};
use crate::policy::is_read_statement;
use crate::table::Table;

/// Which executor a statement is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Read,
    Mutating,
}

impl StatementKind {
    /// Classify by leading keyword: anything that is not `SELECT` mutates.
    pub fn classify(sql: &str) -> Self {
        if is_read_statement(sql) {
            StatementKind::Read
        } else {
            StatementKind::Mutating
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, StatementKind::Read)
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Read => write!(f, "read"),
            StatementKind::Mutating => write!(f, "mutating"),
        }
    }
}

/// Result of dispatching a single statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Read statement returned at least one row.
    ReadSuccess { executed_sql: String, table: Table },
    /// Read statement returned no rows; metadata of the referenced table if found.
    ReadEmpty { metadata_table: Option<Table> },
    /// Mutating statement executed and committed.
    MutationSuccess { affected_row_count: u64 },
    /// The policy gate declined the statement; nothing was executed.
    Rejected { reason: PolicyError },
    /// The executor failed; `statement` records which path was attempted.
    ExecutionError {
        statement: StatementKind,
        error: ExecutionError,
    },
}

impl ExecutionOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionOutcome::ReadSuccess { .. } => "read_success",
            ExecutionOutcome::ReadEmpty { .. } => "read_empty",
            ExecutionOutcome::MutationSuccess { .. } => "mutation_success",
            ExecutionOutcome::Rejected { .. } => "rejected",
            ExecutionOutcome::ExecutionError { .. } => "execution_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::ReadSuccess { .. }
                | ExecutionOutcome::ReadEmpty { .. }
                | ExecutionOutcome::MutationSuccess { .. }
        )
    }
}
