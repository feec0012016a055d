//! Registry Integration Tests
//!
//! Session lifecycle in `AppState`, settings persistence, model selection and
//! the slow statement optimizer.

use std::sync::Arc;

use query_pilot_core::Credentials;
use query_pilot_desktop::services::NO_OPTIMIZATION_PLACEHOLDER;
use query_pilot_desktop::storage::{ConfigService, SqliteDatabase, SqliteSettings};
use query_pilot_desktop::{AppError, NoticeLevel, SettingsUpdate};

use crate::support::{empty_session, seeded_session, test_state, ScriptedModel};

#[tokio::test]
async fn test_sessions_are_independent() {
    let (_dir, state) = test_state();
    let (first_id, first) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let (second_id, second) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    assert_ne!(first_id, second_id);

    first.lock().await.execute_sql("SELECT * FROM employees");
    {
        let mut session = second.lock().await;
        session.set_ddl_dml_enabled(true);
        session.execute_sql("DELETE FROM employees WHERE department = 'IT'");
    }

    let first_snapshot = first.lock().await.snapshot();
    let second_snapshot = second.lock().await.snapshot();
    assert_eq!(first_snapshot.state.query_result().unwrap().row_count(), 5);
    assert!(!first_snapshot.state.ddl_dml_enabled());
    assert!(second_snapshot.state.query_result().is_none());
    assert!(second_snapshot.state.ddl_dml_enabled());

    // Each session has its own in-memory database
    let response = first.lock().await.execute_sql("SELECT id FROM employees");
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 5);
}

#[tokio::test]
async fn test_close_session() {
    let (_dir, state) = test_state();
    let (id, _handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    assert_eq!(state.health().await.active_sessions, 1);
    assert_eq!(state.session_ids().await, vec![id.clone()]);

    state.close_session(&id).await.unwrap();
    assert_eq!(state.health().await.active_sessions, 0);
    assert!(matches!(
        state.session(&id).await.err(),
        Some(AppError::NotFound(_))
    ));
    assert!(matches!(
        state.connect(&id, Credentials::new(":memory:")).await.err(),
        Some(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_connect_reports_error() {
    let (dir, state) = test_state();
    let handle = state
        .create_session_with(
            Box::new(SqliteDatabase::default()),
            Arc::new(ScriptedModel::new()),
        )
        .await
        .unwrap();
    let id = handle.lock().await.id().to_string();

    let missing_dir = dir.path().join("no").join("such").join("dir.db");
    let response = state
        .connect(&id, Credentials::new(missing_dir.to_string_lossy()))
        .await
        .unwrap();
    assert!(!response.session.connected);
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let (dir, state) = test_state();
    let path = dir.path().join("workspace.db").to_string_lossy().into_owned();
    let (id, handle) = empty_session(&state, Arc::new(ScriptedModel::new())).await;

    state.connect(&id, Credentials::new(path.clone())).await.unwrap();
    {
        let mut session = handle.lock().await;
        session.set_ddl_dml_enabled(true);
        session.execute_sql("CREATE TABLE notes (body TEXT)");
        session.execute_sql("INSERT INTO notes VALUES ('kept')");
    }

    let response = state.connect(&id, Credentials::new(path)).await.unwrap();
    // Reconnecting starts from fresh state
    assert!(!response.session.state.ddl_dml_enabled());
    let response = handle.lock().await.execute_sql("SELECT body FROM notes");
    assert_eq!(
        response.session.state.query_result().unwrap().rows[0][0],
        serde_json::json!("kept")
    );
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_persist_and_reset() {
    let (dir, state) = test_state();
    assert_eq!(state.health().await.status, "healthy");

    let updated = state
        .update_config(SettingsUpdate {
            analysis_row_limit: Some(50),
            sql_dialect: Some("PostgreSQL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.analysis_row_limit, 50);

    let reloaded = ConfigService::with_path(dir.path().join("config.json")).unwrap();
    assert_eq!(reloaded.get_config().sql_dialect, "PostgreSQL");

    let invalid = state
        .update_config(SettingsUpdate {
            analysis_row_limit: Some(0),
            ..Default::default()
        })
        .await;
    assert!(invalid.is_err());
    assert_eq!(state.get_config().await.unwrap().analysis_row_limit, 50);

    let reset = state.reset_config().await.unwrap();
    assert_eq!(reset.sql_dialect, "SQLite");
    assert_eq!(reset.analysis_row_limit, 200);
}

#[tokio::test]
async fn test_new_sessions_use_current_row_limit() {
    let (_dir, state) = test_state();
    state
        .update_config(SettingsUpdate {
            analysis_row_limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    let model = Arc::new(ScriptedModel::new().with_answer(Some("ok")));
    let (_id, handle) = seeded_session(&state, model.clone()).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT * FROM employees");
    let response = session
        .request_analysis(query_pilot_core::AnalysisKind::Insights)
        .await;
    assert!(response.notices[0].message.contains("first 2 rows"));
}

// ============================================================================
// Models
// ============================================================================

#[tokio::test]
async fn test_model_selection() {
    let (_dir, state) = test_state();
    let (id, _handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;

    let models = state.list_models(&id).await.unwrap();
    assert_eq!(models.current, "scripted");
    assert_eq!(models.available.len(), 5);

    let response = state.select_model(&id, "llama-3.3-70b-specdec").await.unwrap();
    assert_eq!(response.session.model, "llama-3.3-70b-specdec");

    let rejected = state.select_model(&id, "gpt-unknown").await;
    assert!(matches!(rejected.err(), Some(AppError::Validation(_))));
    assert_eq!(state.list_models(&id).await.unwrap().current, "llama-3.3-70b-specdec");
}

// ============================================================================
// Optimizer
// ============================================================================

#[tokio::test]
async fn test_slow_statements_get_suggestions() {
    let (_dir, state) = test_state();
    let handle = state
        .create_session_with(
            Box::new(SqliteDatabase::new(SqliteSettings {
                pool_size: 1,
                slow_query_threshold: std::time::Duration::ZERO,
            })),
            Arc::new(ScriptedModel::new()),
        )
        .await
        .unwrap();
    let id = handle.lock().await.id().to_string();
    state.connect(&id, Credentials::new(":memory:")).await.unwrap();

    let mut session = handle.lock().await;
    session.set_ddl_dml_enabled(true);
    session.execute_sql("CREATE TABLE employees (id INTEGER, salary REAL)");
    session.execute_sql("SELECT * FROM employees;");
    session.execute_sql("SELECT * FROM employees");
    session.execute_sql("SELECT 42");
    let before = session.state().clone();

    let suggestions = session.analyze_slow_queries().await.unwrap();
    assert_eq!(suggestions.len(), 3);

    let repeated = suggestions
        .iter()
        .find(|s| s.sql_text == "SELECT * FROM employees")
        .unwrap();
    assert_eq!(repeated.executions, 2);
    assert_eq!(
        repeated.suggestion,
        "Add an index for: SELECT * FROM employees"
    );

    let constant = suggestions.iter().find(|s| s.sql_text == "SELECT 42").unwrap();
    assert_eq!(constant.suggestion, NO_OPTIMIZATION_PLACEHOLDER);

    // Sorted slowest first
    assert!(suggestions
        .windows(2)
        .all(|pair| pair[0].elapsed_ms >= pair[1].elapsed_ms));
    assert_eq!(session.state(), &before);
}

#[tokio::test]
async fn test_optimizer_requires_connection() {
    let (_dir, state) = test_state();
    let handle = state
        .create_session_with(
            Box::new(SqliteDatabase::default()),
            Arc::new(ScriptedModel::new()),
        )
        .await
        .unwrap();
    let session = handle.lock().await;
    assert!(matches!(
        session.analyze_slow_queries().await.err(),
        Some(AppError::Database(_))
    ));
}
