//! Model Commands
//!
//! Listing and switching the session's language model.

use tauri::State;

use crate::models::response::{ActionResponse, CommandResponse, ModelList};
use crate::state::AppState;

/// List the models a session may use
#[tauri::command]
pub async fn list_models(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<ModelList>, String> {
    Ok(state.list_models(&session_id).await.into())
}

/// Switch a session to another configured model
#[tauri::command]
pub async fn select_model(
    state: State<'_, AppState>,
    session_id: String,
    model: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    Ok(state.select_model(&session_id, &model).await.into())
}
