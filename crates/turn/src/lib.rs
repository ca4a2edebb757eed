//! The Kindred turn pipeline.
//!
//! One user request in, one tagged outcome out. Per turn the pipeline:
//!
//! 1. Resolves identity, mood, and memory under per-fragment deadlines,
//!    substituting process-wide fallbacks on timeout or error
//! 2. Builds a fresh budget allocator from the validated deployment config
//! 3. Assembles the fixed five-section prompt under that budget
//! 4. Calls the generation backend — the only fatal path
//! 5. Finalizes and emits metrics exactly once
//!
//! Turns are independent units of work: no state is shared across them, so
//! any number can run concurrently without synchronization.

pub mod pipeline;
pub mod resolve;

pub use pipeline::{
    TurnFailure, TurnOutcome, TurnPipeline, TurnRequest, TurnSuccess, SERVICE_UNAVAILABLE,
    SYSTEM_INSTRUCTION,
};
pub use resolve::bounded;
