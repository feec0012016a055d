//! SQLite Database Driver
//!
//! `Database` implementation over rusqlite with r2d2 connection pooling.
//! Statements whose run time reaches the slow-query threshold are kept in an
//! in-memory log that backs `performance_data`.

use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use regex::Regex;
use rusqlite::types::ValueRef;
use serde_json::Value;

use query_pilot_core::{
    Credentials, Database, ExecutionError, MutationSummary, SlowStatement, Table,
};

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Target that opens a private in-memory database.
pub const MEMORY_TARGET: &str = ":memory:";

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Distinct slow statements kept per connection; the fastest are evicted first.
pub const MAX_SLOW_STATEMENTS: usize = 50;

/// Keywords whose statements report row counts; everything else reports 0.
const ROW_CHANGING_KEYWORDS: [&str; 5] = ["INSERT", "UPDATE", "DELETE", "REPLACE", "WITH"];

/// Pool and timing settings for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteSettings {
    pub pool_size: u32,
    pub slow_query_threshold: Duration,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            pool_size: 4,
            slow_query_threshold: Duration::from_millis(500),
        }
    }
}

/// SQLite-backed database driver
pub struct SqliteDatabase {
    settings: SqliteSettings,
    pool: Option<DbPool>,
    target: Option<String>,
    slow_log: Mutex<Vec<SlowStatement>>,
}

impl SqliteDatabase {
    /// Create a disconnected driver
    pub fn new(settings: SqliteSettings) -> Self {
        Self {
            settings,
            pool: None,
            target: None,
            slow_log: Mutex::new(Vec::new()),
        }
    }

    /// Target of the open connection, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    fn build_pool(&self, target: &str) -> Result<DbPool, String> {
        let builder = Pool::builder().connection_timeout(CONNECTION_TIMEOUT);
        let result = if target == MEMORY_TARGET {
            // One long-lived connection, otherwise the database is lost
            builder
                .max_size(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .build(SqliteConnectionManager::memory())
        } else {
            builder
                .max_size(self.settings.pool_size.max(1))
                .build(SqliteConnectionManager::file(target))
        };
        result.map_err(|e| format!("Failed to create connection pool: {}", e))
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, ExecutionError> {
        let pool = self.pool.as_ref().ok_or(ExecutionError::ConnectionMissing)?;
        pool.get()
            .map_err(|e| ExecutionError::other(format!("Failed to get connection: {}", e)))
    }

    fn slow_log(&self) -> MutexGuard<'_, Vec<SlowStatement>> {
        match self.slow_log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record_timing(&self, sql: &str, elapsed: Duration) {
        if elapsed < self.settings.slow_query_threshold {
            return;
        }
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(elapsed_ms, "Recorded slow statement");

        let mut log = self.slow_log();
        match log.iter_mut().find(|entry| entry.sql_text == sql) {
            Some(entry) => {
                entry.elapsed_ms = entry.elapsed_ms.saturating_add(elapsed_ms);
                entry.executions += 1;
            }
            None => log.push(SlowStatement {
                sql_text: sql.to_string(),
                elapsed_ms,
                executions: 1,
            }),
        }

        if log.len() > MAX_SLOW_STATEMENTS {
            log.sort_by(|a, b| b.elapsed_ms.cmp(&a.elapsed_ms));
            log.truncate(MAX_SLOW_STATEMENTS);
        }
    }
}

impl Default for SqliteDatabase {
    fn default() -> Self {
        Self::new(SqliteSettings::default())
    }
}

impl Database for SqliteDatabase {
    fn connect(&mut self, credentials: &Credentials) -> bool {
        self.close();

        let target = credentials.target.trim();
        if target.is_empty() {
            tracing::warn!("Connection attempt without a database target");
            return false;
        }

        let pool = match self.build_pool(target) {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(target, error = %e, "Database connection failed");
                return false;
            }
        };

        let verified = pool
            .get()
            .map_err(|e| e.to_string())
            .and_then(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = verified {
            tracing::warn!(target, error = %e, "Database connection check failed");
            return false;
        }

        tracing::info!(target, "Connected to SQLite database");
        self.pool = Some(pool);
        self.target = Some(target.to_string());
        true
    }

    fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    fn execute_read(&self, sql: &str) -> Result<Table, ExecutionError> {
        let conn = self.connection()?;
        let started = Instant::now();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ExecutionError::driver(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get_ref(i).map(cell_to_json))
                    .collect::<Result<Vec<_>, _>>()
            })
            .and_then(|mapped| mapped.collect::<Result<Vec<_>, _>>())
            .map_err(|e| ExecutionError::driver(e.to_string()))?;

        self.record_timing(sql, started.elapsed());
        Ok(Table::new(columns, rows))
    }

    fn execute_mutation(&self, sql: &str) -> Result<MutationSummary, ExecutionError> {
        let conn = self.connection()?;
        let started = Instant::now();

        let changed = conn
            .execute(sql, [])
            .map_err(|e| ExecutionError::driver(e.to_string()))?;

        self.record_timing(sql, started.elapsed());
        let affected_rows = if reports_row_count(sql) {
            changed as u64
        } else {
            0
        };
        Ok(MutationSummary { affected_rows })
    }

    fn table_metadata(&self, sql: &str) -> Option<Table> {
        let table_name = referenced_table(sql)?;
        let conn = self.connection().ok()?;

        let result = conn
            .prepare(
                "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
            )
            .and_then(|mut stmt| {
                let rows = stmt
                    .query_map([&table_name], |row| {
                        Ok(vec![
                            Value::String(row.get::<_, String>(0)?),
                            Value::String(row.get::<_, String>(1)?),
                            Value::Bool(row.get::<_, i64>(2)? != 0),
                            Value::Bool(row.get::<_, i64>(3)? != 0),
                        ])
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            });

        match result {
            Ok(rows) if !rows.is_empty() => Some(Table::new(
                vec![
                    "column_name".to_string(),
                    "data_type".to_string(),
                    "not_null".to_string(),
                    "primary_key".to_string(),
                ],
                rows,
            )),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(table = %table_name, error = %e, "Error fetching metadata");
                None
            }
        }
    }

    fn performance_data(&self) -> Vec<SlowStatement> {
        let mut statements = self.slow_log().clone();
        statements.sort_by(|a, b| b.elapsed_ms.cmp(&a.elapsed_ms));
        statements
    }

    fn close(&mut self) {
        if let Some(target) = self.target.take() {
            tracing::info!(target = %target, "Closed database connection");
        }
        self.pool = None;
        self.slow_log().clear();
    }
}

/// Cell value as a JSON scalar; blobs become a size marker.
fn cell_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<{} bytes>", bytes.len())),
    }
}

fn reports_row_count(sql: &str) -> bool {
    let upper = sql.trim_start().to_uppercase();
    ROW_CHANGING_KEYWORDS.iter().any(|kw| upper.starts_with(kw))
}

fn from_clause() -> Option<&'static Regex> {
    static FROM_CLAUSE: OnceLock<Option<Regex>> = OnceLock::new();
    FROM_CLAUSE
        .get_or_init(|| Regex::new(r"(?i)\bFROM\s+([^\s,;()]+)").ok())
        .as_ref()
}

/// Table named after the first `FROM`, without schema prefix or quoting.
pub fn referenced_table(sql: &str) -> Option<String> {
    let token = from_clause()?.captures(sql)?.get(1)?.as_str();
    let name = token.rsplit('.').next().unwrap_or(token);
    let name = name.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']' | '\'' | ';'));
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
