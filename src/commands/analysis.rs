//! Analysis Commands
//!
//! Language model analysis of the current result and the chat sub-thread.

use tauri::State;

use query_pilot_core::AnalysisKind;

use crate::models::response::{ActionResponse, CommandResponse};
use crate::state::AppState;

/// Request one analysis kind; `None` requests all of them in order
#[tauri::command]
pub async fn request_analysis(
    state: State<'_, AppState>,
    session_id: String,
    kind: Option<AnalysisKind>,
) -> Result<CommandResponse<ActionResponse>, String> {
    let handle = match state.session(&session_id).await {
        Ok(handle) => handle,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };

    let mut session = handle.lock().await;
    let response = match kind {
        Some(kind) => session.request_analysis(kind).await,
        None => session.request_full_analysis().await,
    };
    Ok(CommandResponse::ok(response))
}

/// Clear the analysis log
#[tauri::command]
pub async fn clear_analysis(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.clear_analysis())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Ask a question about the current result
#[tauri::command]
pub async fn ask_chat(
    state: State<'_, AppState>,
    session_id: String,
    question: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => {
            let mut session = handle.lock().await;
            Ok(CommandResponse::ok(session.ask_chat(&question).await))
        }
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Clear the chat response
#[tauri::command]
pub async fn clear_chat(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.clear_chat())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
