//! Query Pilot LLM
//!
//! Provides a unified interface for chat-completion language model providers.
//! A single OpenAI-compatible provider covers Groq (the default) and OpenAI.
//!
//! Also includes the HTTP client factory and proxy settings.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod proxy;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAICompatibleProvider;
pub use provider::LlmProvider;
pub use proxy::{ProxyConfig, ProxyProtocol};
pub use types::*;
