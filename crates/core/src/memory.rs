//! Memory recall contract — retrieved context for the prompt.
//!
//! Retrieval, ranking, and embedding generation are owned by the memory
//! subsystem; the pipeline only sees the boundary: hand over the request
//! plus a read-only view of the live budget, get back context text. On
//! timeout or error the pipeline substitutes [`NO_CONTEXT_PLACEHOLDER`].

use crate::budget::BudgetAllocator;
use crate::error::MemoryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The fixed neutral text substituted when recall is unavailable.
pub const NO_CONTEXT_PLACEHOLDER: &str = "[No prior relevant context]";

/// The query representation handed to retrieval, separate from the raw
/// request text so callers can attach a precomputed embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// The search text (usually the raw request).
    pub text: String,

    /// Optional embedding of `text`; `None` means keyword-only recall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Maximum number of entries to surface.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

impl MemoryQuery {
    /// A keyword-only query over `text` with the default limit.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embedding: None,
            limit: default_limit(),
        }
    }
}

/// Everything the memory collaborator receives for one recall.
pub struct RecallRequest<'a> {
    pub user_id: &'a str,
    pub session_id: &'a str,
    /// Verbatim user text for this turn.
    pub request_text: &'a str,
    /// Query representation (text, optional embedding, limit).
    pub query: &'a MemoryQuery,
    /// Read-only view of the turn's live allocator, so retrieval can
    /// budget-constrain what it returns.
    pub budget: &'a BudgetAllocator,
    /// The resolved identity's declared expertise domains.
    pub expertise_domains: &'a [String],
}

/// The memory collaborator contract.
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// A human-readable name for this service (e.g. "keyword", "noop").
    fn name(&self) -> &str;

    /// Retrieve context text relevant to the request.
    async fn retrieve(&self, request: RecallRequest<'_>) -> std::result::Result<String, MemoryError>;
}
