//! Query Pilot Core
//!
//! The query-execution-and-session-state pipeline of Query Pilot. This crate
//! has no dependency on application-level code (Tauri, SQLite, HTTP clients).
//!
//! ## Module Organization
//!
//! - `error` - Error taxonomy (`PolicyError`, `ExecutionError`, `AnalysisError`, `ChartError`)
//! - `table` - Tabular query results
//! - `policy` - Policy gate applied before execution
//! - `outcome` - Tagged execution outcomes and statement classification
//! - `dispatcher` - Routes statements to the read or mutating executor
//! - `session_state` - Per-session slots and their reset rules
//! - `analysis` - Analysis and chat prompt building, analysis log updates
//! - `chart` - Chart kinds, requests and artifacts
//! - `service_traits` - Database, language model and chart renderer traits
//!
//! Control flow: `policy::authorize` → `ExecutionDispatcher` →
//! `SessionState::apply` → (on demand) `AnalysisOrchestrator::request`.

pub mod analysis;
pub mod chart;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod service_traits;
pub mod session_state;
pub mod table;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{AnalysisError, ChartError, ExecutionError, PolicyError};

// ── Pipeline ───────────────────────────────────────────────────────────
pub use analysis::{
    limit_rows, AnalysisKind, AnalysisOrchestrator, AnalysisReport, RowLimitWarning,
    DEFAULT_DIALECT, DEFAULT_ROW_LIMIT,
};
pub use dispatcher::ExecutionDispatcher;
pub use outcome::{ExecutionOutcome, StatementKind};
pub use policy::{authorize, is_read_statement};
pub use session_state::{AnalysisEntry, SessionState};
pub use table::Table;

// ── Charts ─────────────────────────────────────────────────────────────
pub use chart::{ChartArtifact, ChartKind, ChartOptions, ChartRequest};

// ── Collaborators ──────────────────────────────────────────────────────
pub use service_traits::{
    ChartRenderer, Credentials, Database, LanguageModel, MutationSummary, SlowStatement,
};
