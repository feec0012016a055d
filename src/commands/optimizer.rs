//! Optimizer Commands
//!
//! Optimisation advice for statements the driver recorded as slow.

use tauri::State;

use crate::models::response::{CommandResponse, OptimizationSuggestion};
use crate::state::AppState;

/// Ask the language model about every recorded slow statement
#[tauri::command]
pub async fn analyze_slow_queries(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<Vec<OptimizationSuggestion>>, String> {
    match state.session(&session_id).await {
        Ok(handle) => {
            let session = handle.lock().await;
            Ok(session.analyze_slow_queries().await.into())
        }
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
