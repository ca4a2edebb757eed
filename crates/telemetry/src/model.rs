//! Data model for degradation events and per-turn metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Degradation events ────────────────────────────────────────────────────

/// The subsystem a degradation originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Identity,
    Mood,
    Memory,
    /// The user's request itself, when it had to be truncated to fit.
    Request,
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Mood => write!(f, "mood"),
            Self::Memory => write!(f, "memory"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// How the subsystem degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    /// The collaborator missed its deadline.
    Timeout,
    /// The collaborator answered with an error.
    Error,
    /// A fallback value was substituted for another reason.
    Fallback,
}

impl std::fmt::Display for DegradationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// One recorded fallback substitution. Immutable, append-only per turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub subsystem: Subsystem,
    pub kind: DegradationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(subsystem: Subsystem, kind: DegradationKind, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

// ── Turn metrics ──────────────────────────────────────────────────────────

/// Terminal status of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// No degradation events, generation succeeded.
    Success,
    /// At least one subsystem fell back; the turn still completed.
    Degraded,
    /// Generation failed — the only fatal path.
    Failed,
}

impl std::fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Degraded => write!(f, "degraded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Complete telemetry for a single turn. Created once, finalized and
/// emitted exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub turn_id: String,
    pub user_id: String,
    pub session_id: String,
    pub total_latency_ms: u64,
    pub tokens_used: usize,
    pub budget_utilization_pct: f32,
    pub degradation_events: Vec<DegradationEvent>,
    pub status: TurnStatus,
    pub timestamp: DateTime<Utc>,
}

impl TurnMetrics {
    /// Start a metrics record for a new turn. Latency, token usage and
    /// status are filled in at finalization.
    pub fn begin(
        turn_id: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            turn_id: turn_id.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            total_latency_ms: 0,
            tokens_used: 0,
            budget_utilization_pct: 0.0,
            degradation_events: Vec::new(),
            status: TurnStatus::Success,
            timestamp: Utc::now(),
        }
    }

    /// Append a degradation event.
    pub fn record(&mut self, event: DegradationEvent) {
        self.degradation_events.push(event);
    }

    /// Resolve the non-fatal terminal status from the recorded events:
    /// degraded if anything fell back, success otherwise. The fatal path
    /// sets [`TurnStatus::Failed`] explicitly instead.
    pub fn finalize_status(&mut self) {
        if self.status != TurnStatus::Failed {
            self.status = if self.degradation_events.is_empty() {
                TurnStatus::Success
            } else {
                TurnStatus::Degraded
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_turn_finalizes_to_success() {
        let mut metrics = TurnMetrics::begin("t-1", "alice", "s-1");
        metrics.finalize_status();
        assert_eq!(metrics.status, TurnStatus::Success);
    }

    #[test]
    fn any_degradation_finalizes_to_degraded() {
        let mut metrics = TurnMetrics::begin("t-1", "alice", "s-1");
        metrics.record(DegradationEvent::new(
            Subsystem::Mood,
            DegradationKind::Timeout,
            "mood resolution timed out after 100ms",
        ));
        metrics.finalize_status();
        assert_eq!(metrics.status, TurnStatus::Degraded);
    }

    #[test]
    fn failed_status_is_not_overwritten() {
        let mut metrics = TurnMetrics::begin("t-1", "alice", "s-1");
        metrics.status = TurnStatus::Failed;
        metrics.finalize_status();
        assert_eq!(metrics.status, TurnStatus::Failed);
    }

    #[test]
    fn metrics_serialize_with_snake_case_tags() {
        let mut metrics = TurnMetrics::begin("t-1", "alice", "s-1");
        metrics.record(DegradationEvent::new(
            Subsystem::Identity,
            DegradationKind::Error,
            "store unreachable",
        ));
        metrics.finalize_status();

        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"subsystem\":\"identity\""));
        assert!(json.contains("\"kind\":\"error\""));
        assert!(json.contains("\"status\":\"degraded\""));
    }

    #[test]
    fn display_forms_are_snake_case() {
        assert_eq!(Subsystem::Identity.to_string(), "identity");
        assert_eq!(DegradationKind::Timeout.to_string(), "timeout");
        assert_eq!(TurnStatus::Degraded.to_string(), "degraded");
    }
}
