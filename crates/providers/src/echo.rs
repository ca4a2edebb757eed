//! Offline echo backend — deterministic completions without a network.

use async_trait::async_trait;
use kindred_core::error::GenerationError;
use kindred_core::generation::GenerationBackend;

/// A backend that acknowledges the prompt instead of calling a model.
///
/// Used by default when no API key is configured, and handy in tests that
/// need a backend which always succeeds.
#[derive(Debug, Default)]
pub struct EchoBackend;

impl EchoBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GenerationBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        Ok(format!(
            "[offline] No generation backend is configured; received a {}-character prompt.",
            prompt.len()
        ))
    }
}
