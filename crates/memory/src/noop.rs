//! No-op recall — disables memory entirely.

use async_trait::async_trait;
use kindred_core::error::MemoryError;
use kindred_core::memory::{MemoryService, RecallRequest, NO_CONTEXT_PLACEHOLDER};

/// A recall service that remembers nothing and always returns the neutral
/// placeholder, keeping the document shape intact.
pub struct NoopRecall;

#[async_trait]
impl MemoryService for NoopRecall {
    fn name(&self) -> &str {
        "noop"
    }

    async fn retrieve(&self, _request: RecallRequest<'_>) -> std::result::Result<String, MemoryError> {
        Ok(NO_CONTEXT_PLACEHOLDER.to_string())
    }
}
