//! Query Commands
//!
//! Natural-language SQL generation and statement execution.

use tauri::State;

use crate::models::response::{ActionResponse, CommandResponse, ExecutionResponse};
use crate::state::AppState;

/// Translate a natural-language request into SQL
#[tauri::command]
pub async fn generate_sql(
    state: State<'_, AppState>,
    session_id: String,
    natural_language: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => {
            let mut session = handle.lock().await;
            Ok(CommandResponse::ok(session.generate_sql(&natural_language).await))
        }
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Execute an edited SQL statement
#[tauri::command]
pub async fn execute_sql(
    state: State<'_, AppState>,
    session_id: String,
    sql: String,
) -> Result<CommandResponse<ExecutionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.execute_sql(&sql))),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Execute the last generated SQL statement
#[tauri::command]
pub async fn execute_generated_sql(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<ExecutionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(
            handle.lock().await.execute_generated_sql(),
        )),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
