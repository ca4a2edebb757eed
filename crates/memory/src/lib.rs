//! Memory recall implementations for Kindred.
//!
//! Two [`MemoryService`](kindred_core::MemoryService) implementations:
//! - [`KeywordRecall`] — in-process store with term-overlap scoring and
//!   expertise-domain boosting; output is capped to a slice of the turn's
//!   remaining token budget
//! - [`NoopRecall`] — always answers with the neutral placeholder

pub mod keyword;
pub mod noop;

pub use keyword::{KeywordRecall, MemoryEntry};
pub use noop::NoopRecall;
