//! Session Commands
//!
//! Session lifecycle and connection commands. Every command names its session
//! by id; one browser window owns one session.

use tauri::State;

use query_pilot_core::Credentials;

use crate::models::response::{ActionResponse, CommandResponse, SessionSnapshot};
use crate::state::AppState;

/// Start a new session
#[tauri::command]
pub async fn create_session(
    state: State<'_, AppState>,
) -> Result<CommandResponse<SessionSnapshot>, String> {
    match state.create_session().await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.snapshot())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// End a session and drop its state
#[tauri::command]
pub async fn close_session(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<()>, String> {
    Ok(state.close_session(&session_id).await.into())
}

/// Get the current state of a session
#[tauri::command]
pub async fn get_session_snapshot(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<SessionSnapshot>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.snapshot())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Connect a session to a database
#[tauri::command]
pub async fn connect_database(
    state: State<'_, AppState>,
    session_id: String,
    credentials: Credentials,
) -> Result<CommandResponse<ActionResponse>, String> {
    Ok(state.connect(&session_id, credentials).await.into())
}

/// Disconnect a session; its state is discarded
#[tauri::command]
pub async fn disconnect_database(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.disconnect())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Enable or disable DDL/DML statements for a session
#[tauri::command]
pub async fn set_ddl_dml_enabled(
    state: State<'_, AppState>,
    session_id: String,
    enabled: bool,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(
            handle.lock().await.set_ddl_dml_enabled(enabled),
        )),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
