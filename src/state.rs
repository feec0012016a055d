//! Application State
//!
//! Global state managed by Tauri: the configuration service and the registry
//! of live sessions. Each session sits behind its own mutex so one action runs
//! to completion before the next starts; sessions never share mutable state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use query_pilot_core::{
    AnalysisOrchestrator, ChartRenderer, Credentials, Database, LanguageModel,
};

use crate::models::response::{ActionResponse, HealthResponse, ModelList, Notice};
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::{LlmLanguageModel, PlotlyChartRenderer, Session};
use crate::storage::{ConfigService, SqliteDatabase, SqliteSettings};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Application state managed by Tauri
pub struct AppState {
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Live sessions keyed by id
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Create a state around an already loaded config service
    pub fn with_config(config: ConfigService) -> Self {
        Self {
            config: Arc::new(RwLock::new(Some(config))),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            initialized: Arc::new(RwLock::new(true)),
        }
    }

    /// Initialize all services
    pub async fn initialize(&self) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        // API keys may live in a .env file next to the app
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load environment file"),
        }

        {
            let config = ConfigService::new()?;
            let mut config_lock = self.config.write().await;
            *config_lock = Some(config);
        }

        *initialized = true;
        tracing::info!("Application state initialized");
        Ok(())
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Health of the backend services
    pub async fn health(&self) -> HealthResponse {
        let config = self.is_config_healthy();
        HealthResponse {
            status: if config { "healthy" } else { "degraded" }.to_string(),
            config,
            active_sessions: self.session_count().await,
            ..Default::default()
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => config.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Restore default settings
    pub async fn reset_config(&self) -> AppResult<AppConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => {
                config.reset()?;
                Ok(config.get_config_clone())
            }
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    // ========================================================================
    // Session registry
    // ========================================================================

    /// Start a session wired to SQLite, the configured model and Plotly.
    pub async fn create_session(&self) -> AppResult<SessionHandle> {
        let config = self.get_config().await?;
        let model = LlmLanguageModel::from_config(&config, &config.default_model)?;
        self.create_session_with(Box::new(sqlite_database(&config)), Arc::new(model))
            .await
    }

    /// Start a session with the given database and model handles.
    pub async fn create_session_with(
        &self,
        database: Box<dyn Database>,
        model: Arc<dyn LanguageModel>,
    ) -> AppResult<SessionHandle> {
        let config = self.get_config().await?;
        let renderer: Arc<dyn ChartRenderer> = Arc::new(PlotlyChartRenderer::new());
        let orchestrator =
            AnalysisOrchestrator::new(config.analysis_row_limit, config.sql_dialect.clone());

        let session = Session::new(database, model, renderer, orchestrator);
        let id = session.id().to_string();
        let handle = Arc::new(Mutex::new(session));

        self.sessions.write().await.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, "Session created");
        Ok(handle)
    }

    /// Look up a live session
    pub async fn session(&self, session_id: &str) -> AppResult<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Session not found: {}", session_id)))
    }

    /// End a session: its connection is closed and its state discarded.
    pub async fn close_session(&self, session_id: &str) -> AppResult<()> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| AppError::not_found(format!("Session not found: {}", session_id)))?;

        handle.lock().await.disconnect();
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    // ========================================================================
    // Session actions needing configuration
    // ========================================================================

    /// Connect a session. A blank target falls back to the configured
    /// database path, then to the workspace database in the app directory.
    pub async fn connect(
        &self,
        session_id: &str,
        credentials: Credentials,
    ) -> AppResult<ActionResponse> {
        let handle = self.session(session_id).await?;
        let credentials = self.resolve_credentials(credentials).await?;
        let mut session = handle.lock().await;
        Ok(session.connect(&credentials))
    }

    async fn resolve_credentials(&self, mut credentials: Credentials) -> AppResult<Credentials> {
        if !credentials.target.trim().is_empty() {
            return Ok(credentials);
        }

        let config = self.get_config().await?;
        credentials.target = match config.default_database_path {
            Some(path) => path,
            None => {
                paths::ensure_query_pilot_dir()?;
                paths::default_database_path()?.to_string_lossy().into_owned()
            }
        };
        Ok(credentials)
    }

    /// Models the session may switch between
    pub async fn list_models(&self, session_id: &str) -> AppResult<ModelList> {
        let config = self.get_config().await?;
        let handle = self.session(session_id).await?;
        let current = handle.lock().await.model_name().to_string();
        Ok(ModelList {
            current,
            available: config.available_models,
        })
    }

    /// Switch the session's language model to one of the configured models.
    pub async fn select_model(&self, session_id: &str, model: &str) -> AppResult<ActionResponse> {
        let config = self.get_config().await?;
        let handle = self.session(session_id).await?;
        let model_handle = LlmLanguageModel::from_config(&config, model)?;

        let mut session = handle.lock().await;
        session.replace_model(Arc::new(model_handle));
        Ok(ActionResponse {
            notices: vec![Notice::success(format!("Model switched to {}.", model))],
            session: session.snapshot(),
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn sqlite_database(config: &AppConfig) -> SqliteDatabase {
    SqliteDatabase::new(SqliteSettings {
        pool_size: config.pool_size,
        slow_query_threshold: Duration::from_millis(config.slow_query_threshold_ms),
    })
}
