//! Visualization Commands
//!
//! Loading chart data and rendering Plotly figures.

use tauri::State;

use query_pilot_core::{ChartKind, ChartRequest};

use crate::models::response::{ActionResponse, ChartResponse, CommandResponse};
use crate::state::AppState;

/// Run a read statement whose result feeds the chart builder
#[tauri::command]
pub async fn execute_viz_sql(
    state: State<'_, AppState>,
    session_id: String,
    sql: String,
) -> Result<CommandResponse<ActionResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.execute_viz_sql(&sql))),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Default field picks for a chart kind
#[tauri::command]
pub async fn default_chart_request(
    state: State<'_, AppState>,
    session_id: String,
    kind: ChartKind,
) -> Result<CommandResponse<Option<ChartRequest>>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(
            handle.lock().await.default_chart_request(kind),
        )),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Render a chart over the visualization result
#[tauri::command]
pub async fn render_chart(
    state: State<'_, AppState>,
    session_id: String,
    request: ChartRequest,
) -> Result<CommandResponse<ChartResponse>, String> {
    match state.session(&session_id).await {
        Ok(handle) => Ok(CommandResponse::ok(handle.lock().await.render_chart(&request))),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
