//! Execution Dispatcher
//!
//! Routes an authorized statement to the read or mutating executor and turns
//! whatever happens into an `ExecutionOutcome`. Failures are wrapped, never
//! retried.

use crate::error::PolicyError;
use crate::outcome::{ExecutionOutcome, StatementKind};
use crate::policy::authorize;
use crate::service_traits::Database;

/// Strip surrounding whitespace and trailing statement terminators.
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Dispatches statements against one database handle.
pub struct ExecutionDispatcher<'a> {
    database: &'a dyn Database,
}

impl<'a> ExecutionDispatcher<'a> {
    pub fn new(database: &'a dyn Database) -> Self {
        Self { database }
    }

    /// Authorize then dispatch a statement.
    pub fn execute(&self, sql: &str, ddl_dml_enabled: bool) -> ExecutionOutcome {
        if let Err(reason) = authorize(sql, ddl_dml_enabled) {
            tracing::info!(%reason, "Statement rejected by policy gate");
            return ExecutionOutcome::Rejected { reason };
        }
        self.dispatch(sql, ddl_dml_enabled)
    }

    /// Dispatch a statement that the caller has already authorized.
    ///
    /// The mutating path is still refused when DDL/DML is disabled.
    pub fn dispatch(&self, sql: &str, ddl_dml_enabled: bool) -> ExecutionOutcome {
        let statement = strip_terminator(sql);
        let kind = StatementKind::classify(statement);

        match kind {
            StatementKind::Read => self.run_read(sql, statement),
            StatementKind::Mutating if !ddl_dml_enabled => {
                tracing::warn!("Mutating statement reached dispatcher with DDL/DML disabled");
                ExecutionOutcome::Rejected {
                    reason: PolicyError::NotAuthorized,
                }
            }
            StatementKind::Mutating => self.run_mutation(statement),
        }
    }

    fn run_read(&self, submitted: &str, statement: &str) -> ExecutionOutcome {
        match self.database.execute_read(statement) {
            Ok(table) if table.is_empty() => {
                let metadata_table = self.database.table_metadata(statement);
                tracing::info!(
                    metadata = metadata_table.is_some(),
                    "Read statement returned no rows"
                );
                ExecutionOutcome::ReadEmpty { metadata_table }
            }
            Ok(table) => {
                tracing::info!(rows = table.row_count(), "Read statement executed");
                ExecutionOutcome::ReadSuccess {
                    executed_sql: submitted.to_string(),
                    table,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Read statement failed");
                ExecutionOutcome::ExecutionError {
                    statement: StatementKind::Read,
                    error,
                }
            }
        }
    }

    fn run_mutation(&self, statement: &str) -> ExecutionOutcome {
        match self.database.execute_mutation(statement) {
            Ok(summary) => {
                tracing::info!(affected = summary.affected_rows, "Mutating statement committed");
                ExecutionOutcome::MutationSuccess {
                    affected_row_count: summary.affected_rows,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Mutating statement failed");
                ExecutionOutcome::ExecutionError {
                    statement: StatementKind::Mutating,
                    error,
                }
            }
        }
    }
}
