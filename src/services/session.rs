//! Session Service
//!
//! One interactive session: its database handle, language model handle and
//! `SessionState`. Every user action is a method here that runs to completion
//! and reports what happened as notices plus a fresh snapshot. Callers hold
//! the session's lock for the whole action.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use query_pilot_core::dispatcher::strip_terminator;
use query_pilot_core::{
    authorize, is_read_statement, AnalysisKind, AnalysisOrchestrator, ChartError, ChartKind,
    ChartRenderer, ChartRequest, Credentials, Database, ExecutionDispatcher, ExecutionOutcome,
    LanguageModel, SessionState,
};

use crate::models::response::{
    ActionResponse, ChartResponse, ExecutionResponse, Notice, OptimizationSuggestion,
    SessionSnapshot,
};
use crate::utils::error::{AppError, AppResult};

/// Recorded when the optimizer gets nothing back for a statement.
pub const NO_OPTIMIZATION_PLACEHOLDER: &str = "No optimization suggestions received from AI.";

/// A single user session.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    database: Box<dyn Database>,
    model: Arc<dyn LanguageModel>,
    renderer: Arc<dyn ChartRenderer>,
    orchestrator: AnalysisOrchestrator,
    state: SessionState,
}

impl Session {
    pub fn new(
        database: Box<dyn Database>,
        model: Arc<dyn LanguageModel>,
        renderer: Arc<dyn ChartRenderer>,
        orchestrator: AnalysisOrchestrator,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            database,
            model,
            renderer,
            orchestrator,
            state: SessionState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.database.is_connected()
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Current state for the frontend to redraw from.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            created_at: self.created_at,
            connected: self.database.is_connected(),
            model: self.model.model().to_string(),
            state: self.state.clone(),
        }
    }

    fn respond(&self, notices: Vec<Notice>) -> ActionResponse {
        ActionResponse {
            notices,
            session: self.snapshot(),
        }
    }

    // ========================================================================
    // Connection
    // ========================================================================

    /// Open a connection. A new connection starts from empty session state.
    pub fn connect(&mut self, credentials: &Credentials) -> ActionResponse {
        if self.database.connect(credentials) {
            self.state = SessionState::new();
            tracing::info!(session_id = %self.id, "Session connected");
            self.respond(vec![Notice::success("Connected to the database.")])
        } else {
            self.respond(vec![Notice::error(
                "Connection failed. Check the database target and try again.",
            )])
        }
    }

    /// Close the connection and discard all session state.
    pub fn disconnect(&mut self) -> ActionResponse {
        self.database.close();
        self.state = SessionState::new();
        tracing::info!(session_id = %self.id, "Session disconnected");
        self.respond(vec![Notice::info("Disconnected from the database.")])
    }

    pub fn set_ddl_dml_enabled(&mut self, enabled: bool) -> ActionResponse {
        self.state.set_ddl_dml_enabled(enabled);
        let notices = if enabled {
            vec![Notice::warning(
                "DDL/DML execution enabled. Statements may modify the database.",
            )]
        } else {
            vec![Notice::info("Only SELECT statements will be executed.")]
        };
        self.respond(notices)
    }

    // ========================================================================
    // SQL generation and execution
    // ========================================================================

    /// Translate a natural-language request into SQL.
    ///
    /// A failed generation keeps the previously generated statement.
    pub async fn generate_sql(&mut self, natural_language: &str) -> ActionResponse {
        let request = natural_language.trim();
        if request.is_empty() {
            return self.respond(vec![Notice::warning("Please enter a question to translate.")]);
        }

        match self.model.generate_sql(request).await {
            Some(sql) => {
                self.state.set_generated_sql(sql);
                self.respond(vec![Notice::success("SQL generated.")])
            }
            None => self.respond(vec![Notice::error(
                "Failed to generate SQL. Please try again.",
            )]),
        }
    }

    /// Run a statement through the policy gate and dispatcher.
    pub fn execute_sql(&mut self, sql: &str) -> ExecutionResponse {
        if sql.trim().is_empty() {
            return ExecutionResponse {
                outcome: None,
                notices: vec![Notice::warning("Please enter a SQL statement.")],
                session: self.snapshot(),
            };
        }

        let outcome = ExecutionDispatcher::new(self.database.as_ref())
            .execute(sql, self.state.ddl_dml_enabled());
        self.state.apply(&outcome);
        tracing::debug!(session_id = %self.id, outcome = outcome.label(), "Statement dispatched");

        let notices = outcome_notices(&outcome, &self.state);
        ExecutionResponse {
            outcome: Some(outcome),
            notices,
            session: self.snapshot(),
        }
    }

    /// Execute the last generated statement.
    pub fn execute_generated_sql(&mut self) -> ExecutionResponse {
        match self.state.generated_sql().map(str::to_string) {
            Some(sql) => self.execute_sql(&sql),
            None => ExecutionResponse {
                outcome: None,
                notices: vec![Notice::warning("No generated SQL to execute.")],
                session: self.snapshot(),
            },
        }
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Request one analysis kind over the current read result.
    pub async fn request_analysis(&mut self, kind: AnalysisKind) -> ActionResponse {
        let result = self
            .orchestrator
            .request(kind, &mut self.state, self.model.as_ref())
            .await;

        let mut notices = Vec::new();
        match result {
            Ok(report) => {
                if let Some(warning) = report.row_warning {
                    notices.push(Notice::warning(warning.message()));
                }
                match report.soft_error {
                    Some(error) => notices.push(Notice::error(error.to_string())),
                    None => notices.push(Notice::success(format!("{} received.", kind.title()))),
                }
            }
            Err(error) => {
                notices.push(Notice::warning(format!(
                    "{} Execute a SELECT statement first.",
                    error
                )));
            }
        }
        self.respond(notices)
    }

    /// Request every analysis kind in order.
    pub async fn request_full_analysis(&mut self) -> ActionResponse {
        if !self.state.has_query_context() {
            return self.respond(vec![Notice::warning(
                "No query context available for analysis. Execute a SELECT statement first.",
            )]);
        }

        let mut notices = Vec::new();
        for kind in AnalysisKind::ALL {
            notices.extend(self.request_analysis(kind).await.notices);
        }
        self.respond(notices)
    }

    pub fn clear_analysis(&mut self) -> ActionResponse {
        self.state.clear_analysis_log();
        self.respond(vec![Notice::info("Analysis results cleared.")])
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Ask a free-form question about the current read result.
    pub async fn ask_chat(&mut self, question: &str) -> ActionResponse {
        let question = question.trim();
        if question.is_empty() {
            return self.respond(vec![Notice::warning("Please enter a question.")]);
        }

        let (prompt, row_warning) = match (self.state.executed_sql(), self.state.query_result()) {
            (Some(sql), Some(table)) => self.orchestrator.build_chat_prompt(sql, table, question),
            _ => {
                return self.respond(vec![Notice::warning(
                    "No query results available. Execute a SELECT statement first.",
                )])
            }
        };

        let mut notices = Vec::new();
        if let Some(warning) = row_warning {
            notices.push(Notice::warning(warning.message()));
        }

        let response = self
            .model
            .analyze(&prompt)
            .await
            .filter(|text| !text.trim().is_empty());
        if response.is_none() {
            notices.push(Notice::error("No response received from AI."));
        }
        self.state.record_chat_exchange(question, response);
        self.respond(notices)
    }

    pub fn clear_chat(&mut self) -> ActionResponse {
        self.state.clear_chat_response();
        self.respond(Vec::new())
    }

    // ========================================================================
    // Visualization
    // ========================================================================

    /// Load data for charting. Only read statements are accepted.
    pub fn execute_viz_sql(&mut self, sql: &str) -> ActionResponse {
        if sql.trim().is_empty() {
            return self.respond(vec![Notice::warning("Please enter a SQL statement.")]);
        }

        if let Err(reason) = authorize(sql, self.state.ddl_dml_enabled()) {
            return self.respond(vec![Notice::error(reason.to_string())]);
        }
        if !is_read_statement(sql) {
            return self.respond(vec![Notice::error(
                "Visualization queries must be SELECT statements.",
            )]);
        }

        let notice = match self.database.execute_read(strip_terminator(sql)) {
            Ok(table) if table.is_empty() => {
                Notice::warning("Visualization query returned no rows.")
            }
            Ok(table) => {
                let rows = table.row_count();
                self.state.set_viz_result(sql, table);
                Notice::success(format!("Loaded {} rows for visualization.", rows))
            }
            Err(error) => {
                tracing::warn!(session_id = %self.id, %error, "Visualization query failed");
                Notice::error(error.to_string())
            }
        };
        self.respond(vec![notice])
    }

    /// Default field picks for a chart kind over the visualization result.
    pub fn default_chart_request(&self, kind: ChartKind) -> Option<ChartRequest> {
        let table = self.state.viz_query_result()?;
        ChartRequest::with_defaults(kind, &table.columns)
    }

    /// Render a chart over the visualization result.
    pub fn render_chart(&self, request: &ChartRequest) -> ChartResponse {
        let rendered = match self.state.viz_query_result() {
            Some(table) => self.renderer.render(request, table),
            None => Err(ChartError::MissingResult),
        };

        match rendered {
            Ok(artifact) => ChartResponse {
                artifact: Some(artifact),
                notices: Vec::new(),
            },
            Err(error) => ChartResponse {
                artifact: None,
                notices: vec![Notice::error(format!("Error generating chart: {}", error))],
            },
        }
    }

    // ========================================================================
    // Optimizer
    // ========================================================================

    /// Ask for optimisation advice on every slow statement the driver saw.
    pub async fn analyze_slow_queries(&self) -> AppResult<Vec<OptimizationSuggestion>> {
        if !self.database.is_connected() {
            return Err(AppError::database("Not connected to a database"));
        }

        let statements = self.database.performance_data();
        tracing::info!(count = statements.len(), "Analyzing slow statements");

        let mut suggestions = Vec::with_capacity(statements.len());
        for statement in statements {
            let suggestion = self
                .model
                .optimize_sql(&statement.sql_text)
                .await
                .unwrap_or_else(|| NO_OPTIMIZATION_PLACEHOLDER.to_string());
            suggestions.push(OptimizationSuggestion {
                sql_text: statement.sql_text,
                elapsed_ms: statement.elapsed_ms,
                executions: statement.executions,
                suggestion,
            });
        }
        Ok(suggestions)
    }

    // ========================================================================
    // Model selection
    // ========================================================================

    /// Swap the language model handle; session state is kept.
    pub fn replace_model(&mut self, model: Arc<dyn LanguageModel>) {
        tracing::info!(session_id = %self.id, model = model.model(), "Language model changed");
        self.model = model;
    }
}

/// Notices describing an execution outcome.
fn outcome_notices(outcome: &ExecutionOutcome, state: &SessionState) -> Vec<Notice> {
    match outcome {
        ExecutionOutcome::ReadSuccess { table, .. } => vec![Notice::success(format!(
            "Query executed successfully. {} rows returned.",
            table.row_count()
        ))],
        ExecutionOutcome::ReadEmpty { metadata_table } => {
            let mut notices = vec![Notice::warning("Query returned no rows.")];
            if metadata_table.is_some() {
                notices.push(Notice::info(
                    "Showing column metadata for the referenced table.",
                ));
            }
            notices
        }
        ExecutionOutcome::MutationSuccess { .. } => vec![Notice::success(
            state
                .ddl_dml_output()
                .unwrap_or("DDL/DML executed successfully."),
        )],
        ExecutionOutcome::Rejected { reason } => vec![Notice::error(reason.to_string())],
        ExecutionOutcome::ExecutionError { statement, error } => vec![Notice::error(format!(
            "Failed to execute {} statement: {}",
            statement, error
        ))],
    }
}
