//! Session State Store
//!
//! The per-session record every panel redraws from. Slots change only through
//! the transition methods below; `apply` is the single place where execution
//! outcomes reset conflicting slots.
//!
//! Invariants held after every transition:
//! - at most one of `query_result` / `ddl_dml_output` is present
//! - `executed_sql` is present exactly when `query_result` is
//! - `analysis_log` only grows while a read result is present

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisKind;
use crate::error::AnalysisError;
use crate::outcome::{ExecutionOutcome, StatementKind};
use crate::table::Table;

/// One entry of the analysis log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub kind: AnalysisKind,
    pub content: String,
}

/// Strongly typed session slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    generated_sql: Option<String>,
    executed_sql: Option<String>,
    query_result: Option<Table>,
    ddl_dml_output: Option<String>,
    analysis_log: Vec<AnalysisEntry>,
    ddl_dml_enabled: bool,
    chat_question: Option<String>,
    chat_response: Option<String>,
    chat_has_response: bool,
    viz_query_result: Option<Table>,
    viz_sql: Option<String>,
}

impl SessionState {
    /// Create an empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Execution outcomes ────────────────────────────────────────────

    /// Fold an execution outcome into the main query slots.
    pub fn apply(&mut self, outcome: &ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::ReadSuccess {
                executed_sql,
                table,
            } => {
                self.executed_sql = Some(executed_sql.clone());
                self.query_result = Some(table.clone());
                self.ddl_dml_output = None;
                self.analysis_log.clear();
            }
            ExecutionOutcome::ReadEmpty { .. } => {
                self.ddl_dml_output = None;
            }
            ExecutionOutcome::MutationSuccess { affected_row_count } => {
                self.ddl_dml_output = Some(format!(
                    "DDL/DML executed successfully. Rows affected: {}",
                    affected_row_count
                ));
                self.executed_sql = None;
                self.query_result = None;
                self.analysis_log.clear();
            }
            ExecutionOutcome::Rejected { .. } => {}
            ExecutionOutcome::ExecutionError { statement, error } => {
                if *statement == StatementKind::Mutating {
                    self.ddl_dml_output = Some(format!("Error: {}", error));
                    // Output slot and read result stay exclusive.
                    self.executed_sql = None;
                    self.query_result = None;
                    self.analysis_log.clear();
                }
            }
        }
    }

    // ── Analysis log ──────────────────────────────────────────────────

    /// Whether a read result is available to analyze.
    pub fn has_query_context(&self) -> bool {
        self.executed_sql.is_some() && self.query_result.is_some()
    }

    /// Append an analysis entry; refused without a read result.
    pub fn append_analysis(
        &mut self,
        kind: AnalysisKind,
        content: impl Into<String>,
    ) -> Result<(), AnalysisError> {
        if !self.has_query_context() {
            return Err(AnalysisError::MissingContext);
        }
        self.analysis_log.push(AnalysisEntry {
            kind,
            content: content.into(),
        });
        Ok(())
    }

    /// Empty the analysis log without touching any other slot.
    pub fn clear_analysis_log(&mut self) {
        self.analysis_log.clear();
    }

    // ── User-driven slots ─────────────────────────────────────────────

    pub fn set_generated_sql(&mut self, sql: impl Into<String>) {
        self.generated_sql = Some(sql.into());
    }

    pub fn set_ddl_dml_enabled(&mut self, enabled: bool) {
        self.ddl_dml_enabled = enabled;
    }

    /// Record a chat question and, when present, its answer.
    pub fn record_chat_exchange(&mut self, question: impl Into<String>, response: Option<String>) {
        self.chat_question = Some(question.into());
        if let Some(response) = response {
            self.chat_response = Some(response);
            self.chat_has_response = true;
        }
    }

    pub fn clear_chat_response(&mut self) {
        self.chat_response = None;
        self.chat_has_response = false;
    }

    pub fn set_viz_result(&mut self, sql: impl Into<String>, table: Table) {
        self.viz_sql = Some(sql.into());
        self.viz_query_result = Some(table);
    }

    // ── Getters ───────────────────────────────────────────────────────

    pub fn generated_sql(&self) -> Option<&str> {
        self.generated_sql.as_deref()
    }

    pub fn executed_sql(&self) -> Option<&str> {
        self.executed_sql.as_deref()
    }

    pub fn query_result(&self) -> Option<&Table> {
        self.query_result.as_ref()
    }

    pub fn ddl_dml_output(&self) -> Option<&str> {
        self.ddl_dml_output.as_deref()
    }

    pub fn analysis_log(&self) -> &[AnalysisEntry] {
        &self.analysis_log
    }

    pub fn ddl_dml_enabled(&self) -> bool {
        self.ddl_dml_enabled
    }

    pub fn chat_question(&self) -> Option<&str> {
        self.chat_question.as_deref()
    }

    pub fn chat_response(&self) -> Option<&str> {
        self.chat_response.as_deref()
    }

    pub fn chat_has_response(&self) -> bool {
        self.chat_has_response
    }

    pub fn viz_query_result(&self) -> Option<&Table> {
        self.viz_query_result.as_ref()
    }

    pub fn viz_sql(&self) -> Option<&str> {
        self.viz_sql.as_deref()
    }
}
