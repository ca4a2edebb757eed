//! Affective state — the companion's point-in-time mood.
//!
//! [`MoodState`] is a small copyable value object. The decay mathematics and
//! the prompt rendering live behind the [`MoodTracker`] trait; the pipeline
//! treats both as pure transforms over the value. [`BASELINE_MOOD`] is the
//! process-wide neutral default substituted when mood resolution fails — it
//! is const-constructed and never mutated.

use crate::error::MoodError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time affective state.
///
/// Dimensions follow a compact valence/arousal model:
/// - `valence`: −1.0 (distressed) .. 1.0 (delighted)
/// - `arousal`: 0.0 (flat) .. 1.0 (activated)
/// - `stability`: 0.0 (volatile) .. 1.0 (settled)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodState {
    pub valence: f32,
    pub arousal: f32,
    pub stability: f32,
    /// When this state was last observed; decay is computed from here.
    pub updated_at: DateTime<Utc>,
}

impl MoodState {
    /// Clamp every dimension into its documented range.
    pub fn clamped(self) -> Self {
        Self {
            valence: self.valence.clamp(-1.0, 1.0),
            arousal: self.arousal.clamp(0.0, 1.0),
            stability: self.stability.clamp(0.0, 1.0),
            updated_at: self.updated_at,
        }
    }
}

/// The neutral resting mood. Substituted without decay when mood resolution
/// fails; also the attractor the decay transform relaxes toward.
pub static BASELINE_MOOD: MoodState = MoodState {
    valence: 0.0,
    arousal: 0.35,
    stability: 0.8,
    updated_at: DateTime::<Utc>::UNIX_EPOCH,
};

/// The mood collaborator contract.
///
/// `resolve` is the only suspension point; `decay` and `render` are pure and
/// synchronous so the pipeline can apply them to fallback values too.
#[async_trait]
pub trait MoodTracker: Send + Sync {
    /// A human-readable name for this tracker.
    fn name(&self) -> &str;

    /// Resolve the stored mood for `user_id`.
    async fn resolve(&self, user_id: &str) -> std::result::Result<MoodState, MoodError>;

    /// Pure decay transform: relax `state` toward baseline as of `now`.
    fn decay(&self, state: MoodState, now: DateTime<Utc>) -> MoodState;

    /// Render `state` as prompt injection text.
    fn render(&self, state: &MoodState) -> String;
}
