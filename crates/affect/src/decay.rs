//! Pure mood decay — exponential relaxation toward baseline.
//!
//! Mood is a perishable signal: an hour-old burst of enthusiasm should not
//! color a new turn at full strength. Each dimension relaxes toward its
//! baseline with a fixed half-life. The transform is pure: no I/O, no
//! clock reads — the caller supplies `now`.

use chrono::{DateTime, Utc};
use kindred_core::mood::{MoodState, BASELINE_MOOD};

/// Half-life of a mood excursion, in seconds (90 minutes).
pub const MOOD_HALF_LIFE_SECS: f64 = 5400.0;

/// Relax `state` toward [`BASELINE_MOOD`] as of `now`.
///
/// A non-positive elapsed interval (clock skew, same-instant reads) returns
/// the state unchanged rather than amplifying it.
pub fn decay_toward_baseline(state: MoodState, now: DateTime<Utc>) -> MoodState {
    let elapsed_ms = (now - state.updated_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return state;
    }

    let factor = 0.5_f64.powf(elapsed_ms as f64 / 1000.0 / MOOD_HALF_LIFE_SECS) as f32;
    let toward = |value: f32, baseline: f32| baseline + (value - baseline) * factor;

    MoodState {
        valence: toward(state.valence, BASELINE_MOOD.valence),
        arousal: toward(state.arousal, BASELINE_MOOD.arousal),
        stability: toward(state.stability, BASELINE_MOOD.stability),
        updated_at: now,
    }
    .clamped()
}
