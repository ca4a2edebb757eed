//! Telemetry sinks — where degradations and turn metrics go.
//!
//! Sinks are fire-and-forget: infallible, synchronous, never on the
//! correctness-critical path of a turn.

use crate::model::{DegradationEvent, TurnMetrics};
use std::sync::Mutex;
use tracing::{info, warn};

/// Sink for degradation events and end-of-turn metrics.
pub trait TelemetrySink: Send + Sync {
    /// Record a single fallback substitution.
    fn record_degradation(&self, event: &DegradationEvent);

    /// Record a finished turn. Called exactly once per turn.
    fn log_turn(&self, metrics: &TurnMetrics);
}

/// Emits JSON lines through `tracing`, ready for ingestion by whatever
/// log shipper the deployment runs.
#[derive(Debug, Default)]
pub struct TracingRecorder;

impl TracingRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingRecorder {
    fn record_degradation(&self, event: &DegradationEvent) {
        warn!(
            subsystem = %event.subsystem,
            kind = %event.kind,
            message = %event.message,
            "DEGRADATION"
        );
    }

    fn log_turn(&self, metrics: &TurnMetrics) {
        match serde_json::to_string(metrics) {
            Ok(json) => info!(turn = %json, "turn complete"),
            Err(e) => warn!(error = %e, turn_id = %metrics.turn_id, "Failed to serialize turn metrics"),
        }
    }
}

/// Captures everything in memory for assertions.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<DegradationEvent>>,
    turns: Mutex<Vec<TurnMetrics>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DegradationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn turns(&self) -> Vec<TurnMetrics> {
        self.turns.lock().unwrap().clone()
    }
}

impl TelemetrySink for MemoryRecorder {
    fn record_degradation(&self, event: &DegradationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn log_turn(&self, metrics: &TurnMetrics) {
        self.turns.lock().unwrap().push(metrics.clone());
    }
}
