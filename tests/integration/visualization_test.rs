//! Visualization Integration Tests
//!
//! The visualization sub-thread: read-only data loading and Plotly figures
//! for every chart kind.

use std::sync::Arc;

use serde_json::json;

use query_pilot_core::{ChartKind, ChartRequest};
use query_pilot_desktop::NoticeLevel;

use crate::support::{seeded_session, test_state, ScriptedModel};

const DEPARTMENT_SQL: &str =
    "SELECT department, name, salary, id FROM employees ORDER BY id;";

#[tokio::test]
async fn test_viz_sql_never_mutates() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    // Disabled toggle: the policy gate refuses
    let response = session.execute_viz_sql("DELETE FROM employees");
    assert_eq!(
        response.notices[0].message,
        "Only SELECT statements are allowed when DDL/DML is disabled."
    );

    // Enabled toggle: still refused, visualization is read-only
    session.set_ddl_dml_enabled(true);
    let response = session.execute_viz_sql("DELETE FROM employees");
    assert_eq!(response.notices[0].level, NoticeLevel::Error);

    let response = session.execute_sql("SELECT COUNT(*) AS n FROM employees");
    let table = response.session.state.query_result().unwrap();
    assert_eq!(table.rows[0][0], json!(5));
}

#[tokio::test]
async fn test_viz_result_is_separate_from_main_result() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT name FROM employees");

    let response = session.execute_viz_sql(DEPARTMENT_SQL);
    let slots = &response.session.state;
    assert_eq!(slots.viz_sql(), Some(DEPARTMENT_SQL));
    assert_eq!(slots.viz_query_result().unwrap().row_count(), 5);
    assert_eq!(slots.executed_sql(), Some("SELECT name FROM employees"));
    assert_eq!(slots.query_result().unwrap().column_count(), 1);

    // Empty results leave the previous chart data in place
    let response = session.execute_viz_sql("SELECT * FROM employees WHERE id < 0");
    assert_eq!(response.notices[0].level, NoticeLevel::Warning);
    assert_eq!(response.session.state.viz_sql(), Some(DEPARTMENT_SQL));

    let response = session.execute_viz_sql("SELECT missing_column FROM employees");
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
    assert_eq!(response.session.state.viz_sql(), Some(DEPARTMENT_SQL));
}

#[tokio::test]
async fn test_every_chart_kind_renders_with_defaults() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.execute_viz_sql("SELECT department, salary, id FROM employees");

    for kind in ChartKind::ALL {
        let request = session.default_chart_request(kind).unwrap();
        assert_eq!(request.x_field, "department");
        let response = session.render_chart(&request);
        let artifact = match response.artifact {
            Some(artifact) => artifact,
            None => panic!("{:?} failed: {:?}", kind, response.notices),
        };
        assert_eq!(artifact.kind, kind);
        assert_eq!(artifact.title, format!("{} of department", kind.label()));
        assert_eq!(artifact.figure["layout"]["height"], 500);
        assert!(!artifact.figure["data"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_heatmap_over_department_and_name() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.execute_viz_sql(DEPARTMENT_SQL);

    let request = ChartRequest::new(ChartKind::Heatmap, "department")
        .with_y("department")
        .with_y("salary");
    let artifact = session.render_chart(&request).artifact.unwrap();
    let trace = &artifact.figure["data"][0];
    assert_eq!(trace["x"], json!(["Executive", "IT", "Finance"]));
    // Executive row, Executive column: mean of 24000 and 17000
    assert_eq!(trace["z"][0][0], json!(20500.0));
    assert_eq!(trace["z"][0][1], serde_json::Value::Null);

    let text_values = ChartRequest::new(ChartKind::Heatmap, "department")
        .with_y("department")
        .with_y("name");
    let response = session.render_chart(&text_values);
    assert!(response.artifact.is_none());
    assert!(response.notices[0].message.starts_with("Error generating chart:"));
}

#[tokio::test]
async fn test_chart_errors_are_notices() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    let request = ChartRequest::new(ChartKind::Bar, "department").with_y("salary");
    let response = session.render_chart(&request);
    assert!(response.artifact.is_none());
    assert!(response.notices[0].message.contains("Execute a query first"));
    assert!(session.default_chart_request(ChartKind::Bar).is_none());

    session.execute_viz_sql(DEPARTMENT_SQL);
    let unknown = ChartRequest::new(ChartKind::Line, "department").with_y("bonus");
    let response = session.render_chart(&unknown);
    assert!(response.artifact.is_none());
    assert!(response.notices[0].message.contains("bonus"));
}

#[tokio::test]
async fn test_chart_options_applied() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.execute_viz_sql(DEPARTMENT_SQL);

    let mut request = ChartRequest::new(ChartKind::Scatter, "id").with_y("salary");
    request.options.title = Some("Salary by id".to_string());
    request.options.color = "#ff7f0e".to_string();
    request.options.height = 5000;

    let artifact = session.render_chart(&request).artifact.unwrap();
    assert_eq!(artifact.title, "Salary by id");
    assert_eq!(artifact.figure["layout"]["height"], 1000);
    assert_eq!(artifact.figure["data"][0]["marker"]["color"], "#ff7f0e");
}
