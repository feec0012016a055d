//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use tauri::State;

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of all backend services
#[tauri::command]
pub async fn get_health(state: State<'_, AppState>) -> Result<CommandResponse<HealthResponse>, String> {
    Ok(CommandResponse::ok(state.health().await))
}
