//! Error Handling
//!
//! `AppError` covers what can fail outside the query pipeline: loading
//! settings, resolving sessions, building model handles and the optimizer's
//! connection check. Pipeline failures stay in the core crate's taxonomy and
//! are reported to the UI as notices instead.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The session has no usable database for the requested action
    #[error("Database error: {0}")]
    Database(String),

    /// Settings could not be loaded or the config service is missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing the settings file or app directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contents
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model provider construction or request failures
    #[error("LLM error: {0}")]
    Llm(#[from] query_pilot_llm::LlmError),

    /// Rejected settings or model selection
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown session id
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Tauri commands report errors as plain strings
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
