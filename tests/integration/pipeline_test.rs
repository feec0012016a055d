//! Pipeline Integration Tests
//!
//! Statements flow through the policy gate and dispatcher into the session
//! slots of a real SQLite session.

use std::sync::Arc;

use query_pilot_core::{ExecutionError, ExecutionOutcome, PolicyError, StatementKind};
use query_pilot_desktop::NoticeLevel;

use crate::support::{seeded_session, test_state, ScriptedModel};

// ============================================================================
// Policy gate
// ============================================================================

#[tokio::test]
async fn test_read_allowed_with_ddl_dml_disabled() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    let response = session.execute_sql("select * from hr.employees");
    match response.outcome {
        Some(ExecutionOutcome::ReadSuccess { executed_sql, table }) => {
            assert_eq!(executed_sql, "select * from hr.employees");
            assert_eq!(table.columns, vec!["employee_id", "last_name", "salary"]);
            assert_eq!(table.row_count(), 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(response.notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_mutation_rejected_when_disabled() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    let response = session.execute_sql("DROP TABLE employees");
    assert_eq!(
        response.outcome,
        Some(ExecutionOutcome::Rejected {
            reason: PolicyError::NotAuthorized
        })
    );

    // The table is still there: nothing reached the driver
    let response = session.execute_sql("SELECT COUNT(*) AS n FROM employees");
    assert!(matches!(
        response.outcome,
        Some(ExecutionOutcome::ReadSuccess { .. })
    ));
}

#[tokio::test]
async fn test_forbidden_pattern_when_enabled() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.set_ddl_dml_enabled(true);

    let response = session.execute_sql("UPDATE hr.employees SET salary=1 WHERE 1=1; --");
    assert!(matches!(
        response.outcome,
        Some(ExecutionOutcome::Rejected {
            reason: PolicyError::ForbiddenPattern { .. }
        })
    ));
    assert!(response.session.state.ddl_dml_output().is_none());

    let response = session.execute_sql("SELECT salary FROM hr.employees WHERE employee_id = 100");
    match response.outcome {
        Some(ExecutionOutcome::ReadSuccess { table, .. }) => {
            assert_eq!(table.rows[0][0], serde_json::json!(24000.0));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

// ============================================================================
// Slot transitions
// ============================================================================

#[tokio::test]
async fn test_empty_read_falls_back_to_metadata() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    session.execute_sql("SELECT name FROM employees WHERE department = 'IT'");
    let before = session.state().clone();

    let response = session.execute_sql("SELECT * FROM Employees WHERE salary > 1000000;");
    let metadata = match response.outcome {
        Some(ExecutionOutcome::ReadEmpty {
            metadata_table: Some(metadata),
        }) => metadata,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(
        metadata.columns,
        vec!["column_name", "data_type", "not_null", "primary_key"]
    );
    assert_eq!(metadata.row_count(), 4);

    let after = &response.session.state;
    assert_eq!(after.executed_sql(), before.executed_sql());
    assert_eq!(after.query_result(), before.query_result());
    assert!(after.ddl_dml_output().is_none());
}

#[tokio::test]
async fn test_empty_read_without_known_table() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    let response = session.execute_sql("SELECT 1 WHERE 1 = 0");
    assert_eq!(
        response.outcome,
        Some(ExecutionOutcome::ReadEmpty {
            metadata_table: None
        })
    );
    assert_eq!(response.notices.len(), 1);
    assert_eq!(response.notices[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_read_then_mutation_then_read() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.set_ddl_dml_enabled(true);

    let response = session.execute_sql("SELECT * FROM employees ORDER BY id");
    assert!(response.session.state.ddl_dml_output().is_none());
    assert!(response.session.state.analysis_log().is_empty());
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 5);

    let response = session.execute_sql("UPDATE employees SET salary = salary * 1.1 WHERE department = 'IT';");
    assert_eq!(
        response.outcome,
        Some(ExecutionOutcome::MutationSuccess {
            affected_row_count: 2
        })
    );
    let slots = &response.session.state;
    assert!(slots.query_result().is_none());
    assert!(slots.executed_sql().is_none());
    assert_eq!(
        slots.ddl_dml_output(),
        Some("DDL/DML executed successfully. Rows affected: 2")
    );

    let response = session.execute_sql("SELECT name FROM employees WHERE salary > 9000");
    assert!(response.session.state.ddl_dml_output().is_none());
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 4);
}

#[tokio::test]
async fn test_ddl_reports_zero_rows() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.set_ddl_dml_enabled(true);

    let response = session.execute_sql("CREATE INDEX idx_salary ON employees (salary)");
    assert_eq!(
        response.outcome,
        Some(ExecutionOutcome::MutationSuccess {
            affected_row_count: 0
        })
    );
}

#[tokio::test]
async fn test_driver_errors_are_wrapped() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    let response = session.execute_sql("SELECT nope FROM employees");
    match response.outcome {
        Some(ExecutionOutcome::ExecutionError { statement, error }) => {
            assert_eq!(statement, StatementKind::Read);
            assert!(matches!(error, ExecutionError::DriverFailure(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    // Read failures do not write the mutation output slot
    assert!(response.session.state.ddl_dml_output().is_none());

    session.set_ddl_dml_enabled(true);
    let response = session.execute_sql("INSERT INTO missing VALUES (1)");
    let output = response.session.state.ddl_dml_output().unwrap();
    assert!(output.starts_with("Error: Database execution error:"));
}

#[tokio::test]
async fn test_rejected_statement_changes_nothing() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;

    session.execute_sql("SELECT * FROM employees");
    let before = session.state().clone();
    let response = session.execute_sql("DELETE FROM employees");
    assert_eq!(response.session.state, before);
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generated_sql_round_trip() {
    let (_dir, state) = test_state();
    let model = ScriptedModel::new()
        .with_sql("SELECT name, salary\nFROM employees\nWHERE department = 'Executive';");
    let (_id, handle) = seeded_session(&state, Arc::new(model)).await;
    let mut session = handle.lock().await;

    let response = session.execute_generated_sql();
    assert!(response.outcome.is_none());
    assert_eq!(response.notices[0].level, NoticeLevel::Warning);

    session.generate_sql("executives and their salaries").await;
    let response = session.execute_generated_sql();
    assert_eq!(response.session.state.query_result().unwrap().row_count(), 2);

    // The scripted model has nothing more to say; the statement is kept
    let response = session.generate_sql("something else").await;
    assert_eq!(response.notices[0].level, NoticeLevel::Error);
    assert!(response.session.state.generated_sql().is_some());
}

#[tokio::test]
async fn test_disconnect_discards_state() {
    let (_dir, state) = test_state();
    let (_id, handle) = seeded_session(&state, Arc::new(ScriptedModel::new())).await;
    let mut session = handle.lock().await;
    session.execute_sql("SELECT * FROM employees");

    let response = session.disconnect();
    assert!(!response.session.connected);
    assert!(response.session.state.query_result().is_none());
    assert!(!response.session.state.ddl_dml_enabled());

    let response = session.execute_sql("SELECT 1");
    assert!(matches!(
        response.outcome,
        Some(ExecutionOutcome::ExecutionError {
            error: ExecutionError::ConnectionMissing,
            ..
        })
    ));
}
