//! Analysis Orchestrator
//!
//! Turns the current read result into language model requests and records the
//! answers in the session's analysis log. Every request with a valid context
//! appends exactly one entry, even when the model returns nothing.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::service_traits::LanguageModel;
use crate::session_state::SessionState;
use crate::table::Table;

/// Default number of result rows sent to the language model.
pub const DEFAULT_ROW_LIMIT: usize = 200;

/// Default dialect named in prompts.
pub const DEFAULT_DIALECT: &str = "SQLite";

/// The three follow-up analyses a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Insights,
    FurtherQueries,
    VizSuggestions,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Insights,
        AnalysisKind::FurtherQueries,
        AnalysisKind::VizSuggestions,
    ];

    /// Heading shown above the log entry.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::Insights => "Insights",
            AnalysisKind::FurtherQueries => "Additional SQL Queries",
            AnalysisKind::VizSuggestions => "Visualization Suggestions",
        }
    }

    /// Entry recorded when the model returns nothing.
    pub fn placeholder(self) -> &'static str {
        match self {
            AnalysisKind::Insights => "No insights received from AI.",
            AnalysisKind::FurtherQueries => "No SQL queries received from AI.",
            AnalysisKind::VizSuggestions => "No visualization suggestions received from AI.",
        }
    }

    fn task(self, dialect: &str) -> String {
        match self {
            AnalysisKind::Insights => "Provide 5 short insights about trends, patterns or anomalies \
                 in this data as bullet points.\nDon't give any SQL queries, just insights."
                .to_string(),
            AnalysisKind::FurtherQueries => format!(
                "Provide additional {dialect} SQL queries to dig deeper into this data, \
                 along with a description of their purpose."
            ),
            AnalysisKind::VizSuggestions => "Suggest visualizations (e.g., Bar Chart, Line Chart, \
                 Scatter Plot, Pie Chart, Histogram, Box Plot, Heatmap) and the SQL that feeds \
                 them, that might help understand this data better."
                .to_string(),
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Emitted when a result was cut down before being sent out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLimitWarning {
    pub total_rows: usize,
    pub row_limit: usize,
}

impl RowLimitWarning {
    pub fn message(&self) -> String {
        format!(
            "Data context size is high ({} rows). The response is based on the first {} rows only.",
            self.total_rows, self.row_limit
        )
    }
}

/// Cap a table at `row_limit` rows, reporting when rows were dropped.
pub fn limit_rows(table: &Table, row_limit: usize) -> (Table, Option<RowLimitWarning>) {
    if table.row_count() > row_limit {
        let warning = RowLimitWarning {
            total_rows: table.row_count(),
            row_limit,
        };
        (table.head(row_limit), Some(warning))
    } else {
        (table.clone(), None)
    }
}

/// What happened during one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub kind: AnalysisKind,
    pub row_warning: Option<RowLimitWarning>,
    /// Set when a placeholder was recorded instead of a model answer.
    pub soft_error: Option<AnalysisError>,
}

/// Builds analysis and chat prompts and records analysis answers.
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    row_limit: usize,
    dialect: String,
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_LIMIT, DEFAULT_DIALECT)
    }
}

impl AnalysisOrchestrator {
    pub fn new(row_limit: usize, dialect: impl Into<String>) -> Self {
        Self {
            row_limit: row_limit.max(1),
            dialect: dialect.into(),
        }
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Prompt for one analysis kind over an executed statement and its result.
    pub fn build_prompt(
        &self,
        kind: AnalysisKind,
        sql: &str,
        table: &Table,
    ) -> (String, Option<RowLimitWarning>) {
        let (limited, warning) = limit_rows(table, self.row_limit);
        let prompt = format!(
            "Here is the query {sql} executed in a {dialect} database, based on that:\n\
             Here is the output from the database:\n\
             {output}\n\
             {task}",
            sql = sql,
            dialect = self.dialect,
            output = limited.to_text(),
            task = kind.task(&self.dialect),
        );
        (prompt, warning)
    }

    /// Prompt for a free-form chat question about the current result.
    pub fn build_chat_prompt(
        &self,
        sql: &str,
        table: &Table,
        question: &str,
    ) -> (String, Option<RowLimitWarning>) {
        let (limited, warning) = limit_rows(table, self.row_limit);
        let prompt = format!(
            "**Task**: Answer the user's question using the SQL query results below. Follow these steps:\n\
             1. Directly answer the question in natural language.\n\
             2. If relevant, provide a {dialect} SQL query to explore further.\n\
             3. Format SQL with ```sql code blocks```.\n\n\
             **Executed SQL**:\n{sql}\n\n\
             **Query Results (limited to {limit} rows if larger)**:\n{output}\n\n\
             **Question**:\n{question}",
            dialect = self.dialect,
            sql = sql,
            limit = self.row_limit,
            output = limited.to_text(),
            question = question,
        );
        (prompt, warning)
    }

    /// Run one analysis request and append its result to the log.
    pub async fn request(
        &self,
        kind: AnalysisKind,
        state: &mut SessionState,
        model: &dyn LanguageModel,
    ) -> Result<AnalysisReport, AnalysisError> {
        let (prompt, row_warning) = match (state.executed_sql(), state.query_result()) {
            (Some(sql), Some(table)) => self.build_prompt(kind, sql, table),
            _ => {
                tracing::info!(%kind, "Analysis requested without query context");
                return Err(AnalysisError::MissingContext);
            }
        };

        if let Some(warning) = &row_warning {
            tracing::info!(
                total_rows = warning.total_rows,
                row_limit = warning.row_limit,
                "Truncated result for analysis prompt"
            );
        }

        let response = model
            .analyze(&prompt)
            .await
            .filter(|text| !text.trim().is_empty());

        let (content, soft_error) = match response {
            Some(text) => (text, None),
            None => {
                tracing::warn!(%kind, "Language model returned no analysis");
                (kind.placeholder().to_string(), Some(AnalysisError::EmptyResponse))
            }
        };
        state.append_analysis(kind, content)?;

        Ok(AnalysisReport {
            kind,
            row_warning,
            soft_error,
        })
    }
}
