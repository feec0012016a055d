//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod chart;
pub mod language_model;
pub mod session;

pub use chart::PlotlyChartRenderer;
pub use language_model::{build_sql_system_prompt, clean_output, LlmLanguageModel};
pub use session::{Session, NO_OPTIMIZATION_PLACEHOLDER};
