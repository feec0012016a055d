//! Language Model Service
//!
//! Adapts an `LlmProvider` to the `LanguageModel` interface the pipeline
//! consumes: fixed prompts per task, output cleaning, and errors folded into
//! `None`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use query_pilot_core::LanguageModel;
use query_pilot_llm::{
    LlmProvider, LlmRequestOptions, Message, OpenAICompatibleProvider, ProviderConfig,
    ProviderType,
};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

/// Sampling temperature for every request.
pub const TEMPERATURE: f32 = 0.2;

/// Build the system prompt used for SQL generation.
pub fn build_sql_system_prompt(dialect: &str) -> String {
    format!(
        "You are a {dialect} SQL expert.\n\n\
         Guidelines:\n\
         - Use strict {dialect} SQL syntax.\n\
         - Prefix tables with their schema name when one is given.\n\
         - Always write keywords in UPPERCASE.\n\
         - End every query with a semicolon (;).\n\
         - Only generate SELECT statements (no INSERT, UPDATE, DELETE, or DDL queries).\n\
         - Use ANSI SQL JOIN syntax when applicable.\n\
         - Start each clause (SELECT, FROM, WHERE, ...) on a new line.\n\
         - Do not add backslashes before special characters such as underscores.\n\n\
         Output only valid {dialect} SQL: no explanations, comments, headers or \
         other non-SQL text. For ambiguous requests make reasonable assumptions \
         and still produce a valid query."
    )
}

fn build_analysis_system_prompt(dialect: &str) -> String {
    format!(
        "You are a {dialect} database assistant. Analyze the provided data and provide \
         insights, recommendations, and new SQL queries to explore further. Avoid any \
         query or syntax that is not compliant with {dialect}."
    )
}

fn build_optimizer_system_prompt(dialect: &str) -> String {
    format!(
        "You are a {dialect} performance tuning expert. Review the statement you are \
         given and suggest concrete optimizations (indexes, rewrites, reduced scans). \
         Show any rewritten SQL in ```sql code blocks```."
    )
}

/// Remove backslashes and unwrap output fenced as a single code block.
pub fn clean_output(raw: &str) -> String {
    let text = raw.replace('\\', "");
    let trimmed = text.trim();
    match trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    {
        Some(inner) => {
            // Drop the info string ("sql") on the opening fence line
            let body = match inner.split_once('\n') {
                Some((first, rest))
                    if first
                        .trim()
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) =>
                {
                    rest
                }
                _ => inner,
            };
            body.trim().to_string()
        }
        None => trimmed.to_string(),
    }
}

/// `LanguageModel` backed by a chat completions provider.
pub struct LlmLanguageModel {
    provider: Arc<dyn LlmProvider>,
    dialect: String,
}

impl LlmLanguageModel {
    pub fn new(provider: Arc<dyn LlmProvider>, dialect: impl Into<String>) -> Self {
        Self {
            provider,
            dialect: dialect.into(),
        }
    }

    /// Build a model handle for `model` from the application configuration.
    ///
    /// The API key is read from the environment variable named in the config;
    /// a missing key surfaces as a failed request, not here.
    pub fn from_config(config: &AppConfig, model: &str) -> AppResult<Self> {
        if !config.is_model_available(model) {
            return Err(AppError::validation(format!(
                "Model {} is not in the available model list",
                model
            )));
        }

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(env = %config.api_key_env, "No language model API key in environment");
        }

        let provider_type = if config.llm_base_url.contains("api.openai.com") {
            ProviderType::OpenAI
        } else {
            ProviderType::Groq
        };

        let provider = OpenAICompatibleProvider::new(ProviderConfig {
            provider: provider_type,
            api_key,
            base_url: Some(config.llm_base_url.clone()),
            model: model.to_string(),
            temperature: TEMPERATURE,
            proxy: config.llm_proxy.clone(),
            ..Default::default()
        })?;
        if let Some(proxy) = &config.llm_proxy {
            info!(proxy = %proxy.url(), "Routing language model requests through proxy");
        }

        Ok(Self::new(Arc::new(provider), config.sql_dialect.clone()))
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Settings the underlying provider was built with.
    pub fn provider_config(&self) -> &ProviderConfig {
        self.provider.config()
    }

    async fn complete(&self, task: &str, system: String, user: String) -> Option<String> {
        debug!(task, model = self.provider.model(), "Sending language model request");
        let response = self
            .provider
            .send_message(vec![Message::user(user)], Some(system), LlmRequestOptions::default())
            .await;

        match response {
            Ok(response) => {
                let cleaned = response
                    .content
                    .map(|raw| clean_output(&raw))
                    .filter(|text| !text.is_empty());
                match &cleaned {
                    Some(text) => info!(task, chars = text.len(), "Received language model output"),
                    None => warn!(task, "Empty response from language model"),
                }
                cleaned
            }
            Err(e) => {
                warn!(task, error = %e, "Language model request failed");
                None
            }
        }
    }
}

#[async_trait]
impl LanguageModel for LlmLanguageModel {
    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn generate_sql(&self, natural_language: &str) -> Option<String> {
        info!(input = %natural_language, "Received natural language input");
        self.complete(
            "generate_sql",
            build_sql_system_prompt(&self.dialect),
            format!("Convert to {} SQL: {}", self.dialect, natural_language),
        )
        .await
    }

    async fn analyze(&self, prompt: &str) -> Option<String> {
        self.complete(
            "analyze",
            build_analysis_system_prompt(&self.dialect),
            prompt.to_string(),
        )
        .await
    }

    async fn optimize_sql(&self, sql: &str) -> Option<String> {
        self.complete(
            "optimize_sql",
            build_optimizer_system_prompt(&self.dialect),
            format!("Suggest optimizations for this statement:\n{}", sql),
        )
        .await
    }
}
