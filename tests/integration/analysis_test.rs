//! Analysis Integration Tests
//!
//! Follow-up analyses, prompt row capping and the chat sub-thread.

use std::sync::Arc;

use query_pilot_core::AnalysisKind;
use query_pilot_desktop::NoticeLevel;

use crate::support::{empty_session, seeded_session, test_state, ScriptedModel};

/// Fill `numbers` with `count` rows through the session itself.
async fn seed_numbers(session: &mut query_pilot_desktop::Session, count: usize) {
    session.set_ddl_dml_enabled(true);
    session.execute_sql("CREATE TABLE numbers (n INTEGER)");
    let response = session.execute_sql(&format!(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < {}) \
         INSERT INTO numbers SELECT n FROM seq",
        count
    ));
    assert_eq!(
        response.session.state.ddl_dml_output(),
        Some(format!("DDL/DML executed successfully. Rows affected: {}", count).as_str())
    );
    session.set_ddl_dml_enabled(false);
}

#[tokio::test]
async fn test_analysis_without_context_appends_nothing() {
    let (_dir, state) = test_state();
    let model = Arc::new(ScriptedModel::new().with_answer(Some("unused")));
    let (_id, handle) = seeded_session(&state, model.clone()).await;
    let mut session = handle.lock().await;

    for kind in AnalysisKind::ALL {
        let response = session.request_analysis(kind).await;
        assert!(response.session.state.analysis_log().is_empty());
        assert_eq!(response.notices[0].level, NoticeLevel::Warning);
    }
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_analysis_entries_in_request_order() {
    let (_dir, state) = test_state();
    let model = Arc::new(
        ScriptedModel::new()
            .with_answer(Some("- Executives earn the most."))
            .with_answer(None)
            .with_answer(Some("Bar chart of salary by department.")),
    );
    let (_id, handle) = seeded_session(&state, model.clone()).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT * FROM employees");

    session.request_analysis(AnalysisKind::Insights).await;
    let response = session.request_analysis(AnalysisKind::FurtherQueries).await;
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
    let response = session
        .request_analysis(AnalysisKind::VizSuggestions)
        .await;

    let log = response.session.state.analysis_log();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].content, "- Executives earn the most.");
    assert_eq!(log[1].kind, AnalysisKind::FurtherQueries);
    assert_eq!(log[1].content, AnalysisKind::FurtherQueries.placeholder());
    assert_eq!(log[2].content, "Bar chart of salary by department.");

    let prompts = model.prompts();
    assert!(prompts[0].contains("SELECT * FROM employees"));
    assert!(prompts[0].contains("Greenberg"));
    assert!(prompts[1].contains("SQLite SQL queries"));

    // A new read result starts a fresh log
    let response = session.execute_sql("SELECT name FROM employees");
    assert!(response.session.state.analysis_log().is_empty());
}

#[tokio::test]
async fn test_large_result_is_capped_in_prompt() {
    let (_dir, state) = test_state();
    let model = Arc::new(ScriptedModel::new().with_answer(Some("Numbers go up.")));
    let (_id, handle) = empty_session(&state, model.clone()).await;
    let mut session = handle.lock().await;
    seed_numbers(&mut session, 500).await;

    let response = session.execute_sql("SELECT n FROM numbers ORDER BY n");
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 500);

    let response = session.request_analysis(AnalysisKind::Insights).await;
    assert_eq!(response.notices[0].level, NoticeLevel::Warning);
    assert!(response.notices[0].message.contains("500 rows"));
    assert!(response.notices[0].message.contains("first 200 rows"));

    let prompt = &model.prompts()[0];
    assert!(prompt.contains("\n199  "));
    assert!(!prompt.contains("\n200  "));
    // The stored result itself is not truncated
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 500);
}

#[tokio::test]
async fn test_small_result_is_sent_whole() {
    let (_dir, state) = test_state();
    let model = Arc::new(ScriptedModel::new().with_answer(Some("Fifty numbers.")));
    let (_id, handle) = empty_session(&state, model.clone()).await;
    let mut session = handle.lock().await;
    seed_numbers(&mut session, 50).await;

    session.execute_sql("SELECT n FROM numbers");
    let response = session.request_analysis(AnalysisKind::Insights).await;
    assert_eq!(response.notices.len(), 1);
    assert_eq!(response.notices[0].level, NoticeLevel::Success);
    assert!(model.prompts()[0].contains("\n49  "));
}

#[tokio::test]
async fn test_full_analysis_and_clear() {
    let (_dir, state) = test_state();
    let model = Arc::new(
        ScriptedModel::new()
            .with_answer(Some("one"))
            .with_answer(Some("two"))
            .with_answer(Some("three")),
    );
    let (_id, handle) = seeded_session(&state, model).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT * FROM employees");

    let response = session.request_full_analysis().await;
    let contents: Vec<&str> = response
        .session
        .state
        .analysis_log()
        .iter()
        .map(|entry| entry.content.as_str())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let response = session.clear_analysis();
    assert!(response.session.state.analysis_log().is_empty());
    // Query context survives clearing the log
    assert!(response.session.state.has_query_context());
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_requires_read_result() {
    let (_dir, state) = test_state();
    let model = Arc::new(ScriptedModel::new().with_answer(Some("unused")));
    let (_id, handle) = seeded_session(&state, model.clone()).await;
    let mut session = handle.lock().await;

    let response = session.ask_chat("Who earns the most?").await;
    assert_eq!(response.notices[0].level, NoticeLevel::Warning);
    assert!(response.session.state.chat_question().is_none());
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_chat_answer_and_clear() {
    let (_dir, state) = test_state();
    let model = Arc::new(
        ScriptedModel::new()
            .with_answer(Some("King earns the most."))
            .with_answer(None),
    );
    let (_id, handle) = seeded_session(&state, model.clone()).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT name, salary FROM employees");

    let response = session.ask_chat("Who earns the most?").await;
    assert!(response.notices.is_empty());
    let chat = &response.session.state;
    assert_eq!(chat.chat_question(), Some("Who earns the most?"));
    assert_eq!(chat.chat_response(), Some("King earns the most."));
    assert!(chat.chat_has_response());

    let prompt = &model.prompts()[0];
    assert!(prompt.contains("**Question**:\nWho earns the most?"));
    assert!(prompt.contains("SELECT name, salary FROM employees"));

    // No answer: error notice, earlier answer stays
    let response = session.ask_chat("And the least?").await;
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
    assert_eq!(response.session.state.chat_question(), Some("And the least?"));
    assert_eq!(
        response.session.state.chat_response(),
        Some("King earns the most.")
    );

    let response = session.clear_chat();
    assert!(response.session.state.chat_response().is_none());
    assert!(!response.session.state.chat_has_response());
}
