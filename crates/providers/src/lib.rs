//! Generation backend implementations for Kindred.
//!
//! - [`ChatCompletionsBackend`] — any OpenAI-compatible
//!   `/chat/completions` endpoint (OpenAI, OpenRouter, Ollama, vLLM, ...)
//! - [`EchoBackend`] — deterministic offline backend for development and
//!   deployments without an API key

pub mod echo;
pub mod openai_compat;

pub use echo::EchoBackend;
pub use openai_compat::ChatCompletionsBackend;

use kindred_config::BackendConfig;
use kindred_core::generation::GenerationBackend;
use std::sync::Arc;

/// Build the backend named by the deployment config.
///
/// Falls back to [`EchoBackend`] when a chat-completions backend is
/// requested without an API key, so a fresh checkout still answers.
pub fn from_config(config: &BackendConfig) -> Arc<dyn GenerationBackend> {
    match (config.provider.as_str(), &config.api_key) {
        ("chat-completions", Some(key)) => Arc::new(ChatCompletionsBackend::new(
            &config.base_url,
            key,
            &config.model,
        )),
        ("chat-completions", None) => {
            tracing::warn!("chat-completions backend configured without an API key, using echo");
            Arc::new(EchoBackend::new())
        }
        _ => Arc::new(EchoBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_is_the_default_backend() {
        let backend = from_config(&BackendConfig::default());
        assert_eq!(backend.name(), "echo");
    }

    #[test]
    fn chat_completions_requires_a_key() {
        let config = BackendConfig {
            provider: "chat-completions".into(),
            api_key: None,
            ..Default::default()
        };
        assert_eq!(from_config(&config).name(), "echo");

        let config = BackendConfig {
            provider: "chat-completions".into(),
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert_eq!(from_config(&config).name(), "chat-completions");
    }
}
