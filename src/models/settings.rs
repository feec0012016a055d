//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

use query_pilot_core::{DEFAULT_DIALECT, DEFAULT_ROW_LIMIT};
use query_pilot_llm::ProxyConfig;

/// Models offered in the model picker.
pub const DEFAULT_MODELS: [&str; 5] = [
    "qwen-2.5-coder-32b",
    "mistral-saba-24b",
    "llama-3.3-70b-specdec",
    "mixtral-8x7b-32768",
    "gemma2-9b-it",
];

pub const MAX_ANALYSIS_ROW_LIMIT: usize = 10_000;
pub const MAX_POOL_SIZE: u32 = 64;

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat completions endpoint (Groq's OpenAI-compatible API by default)
    pub llm_base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Outbound proxy for language model requests; direct when unset
    #[serde(default)]
    pub llm_proxy: Option<ProxyConfig>,
    /// Model selected for new sessions
    pub default_model: String,
    /// Models the user may switch to
    pub available_models: Vec<String>,
    /// Dialect named in prompts
    pub sql_dialect: String,
    /// Maximum rows sent to the language model
    pub analysis_row_limit: usize,
    /// Database opened when a connect request has an empty target
    #[serde(default)]
    pub default_database_path: Option<String>,
    /// Statements at or above this duration are recorded as slow
    pub slow_query_threshold_ms: u64,
    /// Connections per file database
    pub pool_size: u32,
    /// Enable debug mode
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            llm_proxy: None,
            default_model: DEFAULT_MODELS[0].to_string(),
            available_models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            sql_dialect: DEFAULT_DIALECT.to_string(),
            analysis_row_limit: DEFAULT_ROW_LIMIT,
            default_database_path: None,
            slow_query_threshold_ms: 500,
            pool_size: 4,
            debug_mode: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub llm_base_url: Option<String>,
    pub api_key_env: Option<String>,
    /// A blank host removes the proxy
    pub llm_proxy: Option<ProxyConfig>,
    pub default_model: Option<String>,
    pub available_models: Option<Vec<String>>,
    pub sql_dialect: Option<String>,
    pub analysis_row_limit: Option<usize>,
    pub default_database_path: Option<String>,
    pub slow_query_threshold_ms: Option<u64>,
    pub pool_size: Option<u32>,
    pub debug_mode: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.llm_base_url {
            self.llm_base_url = url;
        }
        if let Some(env) = update.api_key_env {
            self.api_key_env = env;
        }
        if let Some(proxy) = update.llm_proxy {
            self.llm_proxy = Some(proxy).filter(|p| !p.host.trim().is_empty());
        }
        if let Some(model) = update.default_model {
            self.default_model = model;
        }
        if let Some(models) = update.available_models {
            self.available_models = models;
        }
        if let Some(dialect) = update.sql_dialect {
            self.sql_dialect = dialect;
        }
        if let Some(limit) = update.analysis_row_limit {
            self.analysis_row_limit = limit;
        }
        if let Some(path) = update.default_database_path {
            // An empty string clears the default
            self.default_database_path = Some(path).filter(|p| !p.trim().is_empty());
        }
        if let Some(threshold) = update.slow_query_threshold_ms {
            self.slow_query_threshold_ms = threshold;
        }
        if let Some(size) = update.pool_size {
            self.pool_size = size;
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
    }

    /// Whether a model may be selected.
    pub fn is_model_available(&self, model: &str) -> bool {
        self.available_models.iter().any(|m| m == model)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.llm_base_url.starts_with("http://") && !self.llm_base_url.starts_with("https://")
        {
            return Err(format!("Invalid llm_base_url: {}", self.llm_base_url));
        }

        if self.api_key_env.trim().is_empty() {
            return Err("api_key_env cannot be empty".to_string());
        }

        if let Some(proxy) = &self.llm_proxy {
            if proxy.port == 0 {
                return Err(format!("llm_proxy port cannot be 0 for host {}", proxy.host));
            }
        }

        if self.available_models.is_empty() {
            return Err("available_models cannot be empty".to_string());
        }

        if !self.is_model_available(&self.default_model) {
            return Err(format!(
                "default_model {} is not listed in available_models",
                self.default_model
            ));
        }

        if self.sql_dialect.trim().is_empty() {
            return Err("sql_dialect cannot be empty".to_string());
        }

        if !(1..=MAX_ANALYSIS_ROW_LIMIT).contains(&self.analysis_row_limit) {
            return Err(format!(
                "analysis_row_limit must be between 1 and {}",
                MAX_ANALYSIS_ROW_LIMIT
            ));
        }

        if !(1..=MAX_POOL_SIZE).contains(&self.pool_size) {
            return Err(format!("pool_size must be between 1 and {}", MAX_POOL_SIZE));
        }

        Ok(())
    }
}
