//! Shared test fixtures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use query_pilot_core::{Credentials, LanguageModel};
use query_pilot_desktop::storage::{ConfigService, SqliteDatabase, MEMORY_TARGET};
use query_pilot_desktop::{AppState, SessionHandle};

/// Language model that replays queued answers and records every prompt.
///
/// An empty queue answers `None`, like a model that returned nothing.
#[derive(Default)]
pub struct ScriptedModel {
    sql: Mutex<VecDeque<Option<String>>>,
    answers: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sql(self, sql: &str) -> Self {
        self.sql.lock().unwrap().push_back(Some(sql.to_string()));
        self
    }

    pub fn with_answer(self, answer: Option<&str>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate_sql(&self, _natural_language: &str) -> Option<String> {
        self.sql.lock().unwrap().pop_front().flatten()
    }

    async fn analyze(&self, prompt: &str) -> Option<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers.lock().unwrap().pop_front().flatten()
    }

    async fn optimize_sql(&self, sql: &str) -> Option<String> {
        sql.contains("employees")
            .then(|| format!("Add an index for: {}", sql))
    }
}

/// App state with a config file in a temporary directory.
pub fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let config = ConfigService::with_path(dir.path().join("config.json")).unwrap();
    (dir, AppState::with_config(config))
}

/// Register a session on an in-memory database without seeding it.
pub async fn empty_session(state: &AppState, model: Arc<ScriptedModel>) -> (String, SessionHandle) {
    let handle = state
        .create_session_with(Box::new(SqliteDatabase::default()), model)
        .await
        .unwrap();
    let id = handle.lock().await.id().to_string();
    let response = state
        .connect(&id, Credentials::new(MEMORY_TARGET))
        .await
        .unwrap();
    assert!(response.session.connected);
    (id, handle)
}

/// Register a connected session seeded with an `employees` table in `main`
/// and an `hr` schema holding `hr.employees`.
pub async fn seeded_session(state: &AppState, model: Arc<ScriptedModel>) -> (String, SessionHandle) {
    let (id, handle) = empty_session(state, model).await;
    {
        let mut session = handle.lock().await;
        session.set_ddl_dml_enabled(true);
        for sql in [
            "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT NOT NULL, department TEXT, salary REAL)",
            "INSERT INTO employees VALUES \
             (1, 'King', 'Executive', 24000), \
             (2, 'Kochhar', 'Executive', 17000), \
             (3, 'Hunold', 'IT', 9000), \
             (4, 'Ernst', 'IT', 6000), \
             (5, 'Greenberg', 'Finance', 12008)",
            "ATTACH DATABASE ':memory:' AS hr",
            "CREATE TABLE hr.employees (employee_id INTEGER, last_name TEXT, salary REAL)",
            "INSERT INTO hr.employees VALUES (100, 'King', 24000), (101, 'Kochhar', 17000)",
        ] {
            let response = session.execute_sql(sql);
            assert!(
                response.outcome.as_ref().is_some_and(|o| o.is_success()),
                "seed statement failed: {} -> {:?}",
                sql,
                response.outcome
            );
        }
        session.set_ddl_dml_enabled(false);
    }
    (id, handle)
}
