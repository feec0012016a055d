// Query Pilot Desktop - Tauri Application Entry Point
// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use query_pilot_desktop::state::AppState;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("query_pilot_desktop=info,query_pilot_core=info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(AppState::new())
        .setup(|app| {
            let state = app.state::<AppState>();
            tauri::async_runtime::block_on(async {
                if let Err(e) = state.initialize().await {
                    tracing::error!(error = %e, "Failed to initialize application state");
                }
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Initialization commands
            query_pilot_desktop::commands::init::init_app,
            query_pilot_desktop::commands::init::get_version,
            // Health commands
            query_pilot_desktop::commands::health::get_health,
            // Settings commands
            query_pilot_desktop::commands::settings::get_settings,
            query_pilot_desktop::commands::settings::update_settings,
            query_pilot_desktop::commands::settings::reset_settings,
            // Session commands
            query_pilot_desktop::commands::sessions::create_session,
            query_pilot_desktop::commands::sessions::close_session,
            query_pilot_desktop::commands::sessions::get_session_snapshot,
            query_pilot_desktop::commands::sessions::connect_database,
            query_pilot_desktop::commands::sessions::disconnect_database,
            query_pilot_desktop::commands::sessions::set_ddl_dml_enabled,
            // Query commands
            query_pilot_desktop::commands::query::generate_sql,
            query_pilot_desktop::commands::query::execute_sql,
            query_pilot_desktop::commands::query::execute_generated_sql,
            // Analysis commands
            query_pilot_desktop::commands::analysis::request_analysis,
            query_pilot_desktop::commands::analysis::clear_analysis,
            query_pilot_desktop::commands::analysis::ask_chat,
            query_pilot_desktop::commands::analysis::clear_chat,
            // Visualization commands
            query_pilot_desktop::commands::visualization::execute_viz_sql,
            query_pilot_desktop::commands::visualization::default_chart_request,
            query_pilot_desktop::commands::visualization::render_chart,
            // Optimizer commands
            query_pilot_desktop::commands::optimizer::analyze_slow_queries,
            // Model commands
            query_pilot_desktop::commands::models::list_models,
            query_pilot_desktop::commands::models::select_model,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
