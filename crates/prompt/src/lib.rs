//! Prompt construction for Kindred turns.
//!
//! Two pieces:
//! - [`token`] — the character-heuristic token estimator every cost check
//!   goes through
//! - [`assembler`] — turns an ordered section list into the fixed-shape
//!   document without ever exceeding the turn's budget allocator
//!
//! The section vocabulary itself lives in [`section`]: a closed five-header
//! set with a fixed wrapper format and a per-header degradation policy.

pub mod assembler;
pub mod section;
pub mod token;

pub use assembler::{AssembledPrompt, SectionAssembler};
pub use section::{Section, SectionHeader, OMITTED_CONTEXT_PLACEHOLDER};
