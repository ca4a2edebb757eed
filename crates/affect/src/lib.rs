//! Affective state engine for Kindred.
//!
//! Three pieces, all deterministic:
//! - [`decay`] — pure exponential relaxation of a mood toward baseline
//! - [`render`] — natural-language injection text for the prompt
//! - [`tracker`] — an in-process [`MoodTracker`](kindred_core::MoodTracker)
//!   implementation wiring the two to per-user stored state

pub mod decay;
pub mod render;
pub mod tracker;

pub use decay::{decay_toward_baseline, MOOD_HALF_LIFE_SECS};
pub use render::injection_text;
pub use tracker::InMemoryMoodTracker;
