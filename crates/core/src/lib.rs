//! # Kindred Core
//!
//! Domain types, traits, and error definitions for the Kindred companion
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the turn pipeline talks to (identity storage, mood
//! tracking, memory recall, text generation) is defined as a trait here.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod budget;
pub mod error;
pub mod generation;
pub mod identity;
pub mod memory;
pub mod mood;
pub mod resolution;

// Re-export key types at crate root for ergonomics
pub use budget::{BudgetAllocator, BudgetReport, MIN_VIABLE_CEILING};
pub use error::{Error, Result};
pub use generation::GenerationBackend;
pub use identity::{IdentitySnapshot, IdentityStore, MINIMAL_SKELETON_IDENTITY};
pub use memory::{MemoryQuery, MemoryService, RecallRequest, NO_CONTEXT_PLACEHOLDER};
pub use mood::{MoodState, MoodTracker, BASELINE_MOOD};
pub use resolution::{FallbackCause, Resolution};
