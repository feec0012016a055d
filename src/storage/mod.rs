//! Storage Layer
//!
//! Handles data access: the SQLite database driver and the JSON config file.

pub mod config;
pub mod sqlite;

pub use config::*;
pub use sqlite::*;
