//! Error types for the Kindred domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. The turn pipeline
//! intercepts the soft ones (identity, mood, memory) at the call site and
//! converts them to fallbacks; only generation failures terminate a turn.

use thiserror::Error;

/// The top-level error type for all Kindred operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Identity errors ---
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    // --- Mood errors ---
    #[error("Mood error: {0}")]
    Mood(#[from] MoodError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Budget errors ---
    #[error("Budget error: {0}")]
    Budget(#[from] BudgetError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("No identity snapshot for user: {0}")]
    NotFound(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Snapshot storage error: {0}")]
    Storage(String),

    #[error("Malformed snapshot: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error)]
pub enum MoodError {
    #[error("No mood state for user: {0}")]
    NotFound(String),

    #[error("Mood storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Recall storage error: {0}")]
    Storage(String),

    #[error("Recall query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned an empty completion")]
    EmptyResponse,
}

#[derive(Debug, Clone, Error)]
pub enum BudgetError {
    #[error(
        "Derived capacity ceiling {ceiling} is below the minimum viable {minimum} — \
         context window too small for reasonable operation"
    )]
    CeilingTooSmall { ceiling: i64, minimum: usize },
}
