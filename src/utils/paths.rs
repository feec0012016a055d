//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.query-pilot/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Query Pilot directory (~/.query-pilot/)
pub fn query_pilot_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".query-pilot"))
}

/// Get the config file path (~/.query-pilot/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(query_pilot_dir()?.join("config.json"))
}

/// Get the default database path (~/.query-pilot/workspace.db)
pub fn default_database_path() -> AppResult<PathBuf> {
    Ok(query_pilot_dir()?.join("workspace.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Query Pilot directory, creating if it doesn't exist
pub fn ensure_query_pilot_dir() -> AppResult<PathBuf> {
    let path = query_pilot_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
