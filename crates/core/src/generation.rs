//! Generation backend contract — the abstraction over text generators.
//!
//! A backend takes one fully assembled prompt and returns one completion.
//! Unlike the other collaborators this call has no bounded wait and no
//! fallback: its failure is the single fatal path of a turn.

use crate::error::GenerationError;
use async_trait::async_trait;

/// The generation collaborator contract.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// A human-readable name for this backend (e.g. "chat-completions", "echo").
    fn name(&self) -> &str;

    /// Generate a completion for the assembled prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}
