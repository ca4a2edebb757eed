//! In-process mood tracker.
//!
//! Stores per-user mood behind an `RwLock`; unknown users resolve to the
//! resting baseline. Decay and rendering delegate to the pure functions so
//! the trait surface and the free functions can never drift apart.

use crate::decay::decay_toward_baseline;
use crate::render::injection_text;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_core::error::MoodError;
use kindred_core::mood::{MoodState, MoodTracker, BASELINE_MOOD};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// A mood tracker backed by an in-process map.
#[derive(Default)]
pub struct InMemoryMoodTracker {
    states: RwLock<HashMap<String, MoodState>>,
}

impl InMemoryMoodTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed mood for `user_id`.
    pub fn observe(&self, user_id: impl Into<String>, state: MoodState) {
        let user_id = user_id.into();
        debug!(user_id = %user_id, "Recording observed mood");
        self.states.write().unwrap().insert(user_id, state);
    }
}

#[async_trait]
impl MoodTracker for InMemoryMoodTracker {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn resolve(&self, user_id: &str) -> std::result::Result<MoodState, MoodError> {
        Ok(self
            .states
            .read()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or(BASELINE_MOOD))
    }

    fn decay(&self, state: MoodState, now: DateTime<Utc>) -> MoodState {
        decay_toward_baseline(state, now)
    }

    fn render(&self, state: &MoodState) -> String {
        injection_text(state)
    }
}
