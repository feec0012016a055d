//! Query Pilot Desktop - Rust Backend Library
//!
//! This library provides the backend of the Query Pilot desktop application,
//! a natural-language SQL assistant. It includes:
//! - Tauri command handlers for frontend IPC (behind the `desktop` feature)
//! - Session services wiring the query pipeline to SQLite, the language model
//!   and the chart renderer
//! - Storage layer (SQLite driver, JSON config)
//! - Data models and utilities

#[cfg(feature = "desktop")]
pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::Session;
pub use state::{AppState, SessionHandle};
pub use utils::error::{AppError, AppResult};
