//! The per-turn orchestration pipeline.
//!
//! Stages run strictly in order; every stage before generation degrades
//! softly, and generation alone can fail the turn. No fault escapes
//! [`TurnPipeline::process_turn`] — callers branch on the returned
//! [`TurnOutcome`], never on panics or error propagation.

use crate::resolve;
use chrono::Utc;
use kindred_config::{BudgetConfig, ConfigError, RuntimeConfig, TimeoutConfig};
use kindred_core::generation::GenerationBackend;
use kindred_core::identity::{IdentitySnapshot, IdentityStore, MINIMAL_SKELETON_IDENTITY};
use kindred_core::memory::{MemoryQuery, MemoryService, RecallRequest, NO_CONTEXT_PLACEHOLDER};
use kindred_core::mood::{MoodState, MoodTracker, BASELINE_MOOD};
use kindred_core::resolution::{FallbackCause, Resolution};
use kindred_prompt::section::{Section, SectionHeader};
use kindred_prompt::SectionAssembler;
use kindred_telemetry::{
    DegradationEvent, DegradationKind, Subsystem, TelemetrySink, TurnMetrics, TurnStatus,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

/// The static instruction heading every assembled prompt.
pub const SYSTEM_INSTRUCTION: &str = "Act as the kernel defined in IDENTITY SNAPSHOT.";

/// The fixed user-visible message for the fatal path.
pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable";

/// One user request, plus optional caller-supplied overrides that bypass
/// the corresponding fetch (but not the decay/render transforms).
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub user_id: String,
    pub session_id: String,
    pub user_text: String,
    pub identity_override: Option<IdentitySnapshot>,
    pub mood_override: Option<MoodState>,
}

impl TurnRequest {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        user_text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            user_text: user_text.into(),
            identity_override: None,
            mood_override: None,
        }
    }

    pub fn with_identity(mut self, snapshot: IdentitySnapshot) -> Self {
        self.identity_override = Some(snapshot);
        self
    }

    pub fn with_mood(mut self, mood: MoodState) -> Self {
        self.mood_override = Some(mood);
        self
    }
}

/// Tagged turn result. Exactly one variant carries a response; callers
/// branch on the data, not on exception handling.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The turn completed (possibly degraded — check the metrics).
    Completed(TurnSuccess),
    /// Generation failed; there is no response.
    Unavailable(TurnFailure),
}

impl TurnOutcome {
    /// The finalized metrics, on either path.
    pub fn metrics(&self) -> &TurnMetrics {
        match self {
            Self::Completed(s) => &s.metrics,
            Self::Unavailable(f) => &f.metrics,
        }
    }
}

/// The successful turn payload.
#[derive(Debug, Clone)]
pub struct TurnSuccess {
    pub response: String,
    /// Version of the identity snapshot the prompt was built from.
    pub identity_version: String,
    /// The decayed mood state used for the prompt.
    pub mood: MoodState,
    pub metrics: TurnMetrics,
}

/// The fatal-path payload: a fixed human-readable error, no response.
#[derive(Debug, Clone)]
pub struct TurnFailure {
    pub error: String,
    pub metrics: TurnMetrics,
}

/// The top-level turn orchestrator.
///
/// Holds only shared-immutable collaborators; all per-turn state (budget
/// allocator, section list, metrics) is constructed inside
/// [`process_turn`], so one pipeline instance serves any number of
/// concurrent turns.
pub struct TurnPipeline {
    identity: Arc<dyn IdentityStore>,
    mood: Arc<dyn MoodTracker>,
    memory: Arc<dyn MemoryService>,
    backend: Arc<dyn GenerationBackend>,
    telemetry: Arc<dyn TelemetrySink>,
    budget: BudgetConfig,
    timeouts: TimeoutConfig,
    assembler: SectionAssembler,
}

impl TurnPipeline {
    /// Build a pipeline from validated deployment configuration.
    ///
    /// Validation runs here, once, so per-turn budget construction can
    /// never fail afterwards.
    pub fn new(
        config: &RuntimeConfig,
        identity: Arc<dyn IdentityStore>,
        mood: Arc<dyn MoodTracker>,
        memory: Arc<dyn MemoryService>,
        backend: Arc<dyn GenerationBackend>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            identity,
            mood,
            memory,
            backend,
            telemetry,
            budget: config.budget.clone(),
            timeouts: config.timeouts.clone(),
            assembler: SectionAssembler::new(),
        })
    }

    /// Process one turn: single request in, single tagged outcome out.
    pub async fn process_turn(&self, request: TurnRequest) -> TurnOutcome {
        let started = Instant::now();
        let turn_id = Uuid::new_v4().to_string();
        let mut metrics = TurnMetrics::begin(&turn_id, &request.user_id, &request.session_id);

        info!(
            turn_id = %turn_id,
            user_id = %request.user_id,
            session_id = %request.session_id,
            "Processing turn"
        );

        // ── Identity resolution ────────────────────────────────────────
        let identity_resolution = match request.identity_override {
            Some(snapshot) => Resolution::Fresh(snapshot),
            None => {
                resolve::bounded(
                    Duration::from_millis(self.timeouts.identity_ms),
                    self.identity.resolve(&request.user_id),
                    || MINIMAL_SKELETON_IDENTITY.clone(),
                )
                .await
            }
        };
        let (identity, cause) = identity_resolution.into_parts();
        if let Some(cause) = cause {
            self.degrade(&mut metrics, Subsystem::Identity, cause);
        }
        debug!(turn_id = %turn_id, version = %identity.version, stage = "identity_resolved", "Stage complete");

        // ── Mood resolution ────────────────────────────────────────────
        let mood_resolution = match request.mood_override {
            Some(state) => Resolution::Fresh(state),
            None => {
                resolve::bounded(
                    Duration::from_millis(self.timeouts.mood_ms),
                    self.mood.resolve(&request.user_id),
                    || BASELINE_MOOD,
                )
                .await
            }
        };
        // Fresh (or overridden) mood passes through decay; the baseline
        // fallback is used as-is.
        let mood = match mood_resolution {
            Resolution::Fresh(state) => self.mood.decay(state, Utc::now()),
            Resolution::Fallback { value, cause } => {
                self.degrade(&mut metrics, Subsystem::Mood, cause);
                value
            }
        };
        debug!(turn_id = %turn_id, stage = "mood_resolved", "Stage complete");

        // ── Budget construction ────────────────────────────────────────
        // Parameters were validated at pipeline construction; this cannot
        // fail and records no degradation.
        let mut allocator = self.budget.allocator();
        debug!(turn_id = %turn_id, ceiling = allocator.ceiling(), stage = "budget_ready", "Stage complete");

        // ── Memory resolution ──────────────────────────────────────────
        let query = MemoryQuery::text_only(&request.user_text);
        let memory_resolution = resolve::bounded(
            Duration::from_millis(self.timeouts.memory_ms),
            self.memory.retrieve(RecallRequest {
                user_id: &request.user_id,
                session_id: &request.session_id,
                request_text: &request.user_text,
                query: &query,
                budget: &allocator,
                expertise_domains: &identity.expertise_domains,
            }),
            || NO_CONTEXT_PLACEHOLDER.to_string(),
        )
        .await;
        let (memory_context, cause) = memory_resolution.into_parts();
        if let Some(cause) = cause {
            self.degrade(&mut metrics, Subsystem::Memory, cause);
        }
        debug!(turn_id = %turn_id, stage = "memory_resolved", "Stage complete");

        // ── Prompt assembly ────────────────────────────────────────────
        // All resolutions have completed (fresh or fallback) before this
        // point; sections go in fixed priority order regardless of which
        // upstream finished first.
        let sections = [
            Section::new(SectionHeader::System, SYSTEM_INSTRUCTION),
            Section::new(SectionHeader::IdentitySnapshot, identity.prompt_block()),
            Section::new(SectionHeader::MoodState, self.mood.render(&mood)),
            Section::new(SectionHeader::RelevantMemory, memory_context),
            Section::new(SectionHeader::CurrentRequest, request.user_text.clone()),
        ];
        let prompt = self.assembler.assemble(&sections, &mut allocator);

        if prompt.degraded.contains(&SectionHeader::RelevantMemory) {
            self.record(
                &mut metrics,
                DegradationEvent::new(
                    Subsystem::Memory,
                    DegradationKind::Fallback,
                    "memory section replaced by placeholder under budget pressure",
                ),
            );
        }
        if prompt.request_truncated {
            self.record(
                &mut metrics,
                DegradationEvent::new(
                    Subsystem::Request,
                    DegradationKind::Fallback,
                    "request content truncated to fit the capacity ceiling",
                ),
            );
        }
        debug!(
            turn_id = %turn_id,
            prompt_len = prompt.text.len(),
            omitted = prompt.omitted.len(),
            stage = "prompt_assembled",
            "Stage complete"
        );

        // ── Generation — the only fatal path ───────────────────────────
        match self.backend.generate(&prompt.text).await {
            Ok(response) => {
                self.finalize(&mut metrics, &allocator, started, None);
                debug!(turn_id = %turn_id, stage = "response_ready", "Stage complete");
                TurnOutcome::Completed(TurnSuccess {
                    response,
                    identity_version: identity.version,
                    mood,
                    metrics,
                })
            }
            Err(e) => {
                error!(turn_id = %turn_id, error = %e, "Generation backend failure, turn aborted");
                self.finalize(&mut metrics, &allocator, started, Some(TurnStatus::Failed));
                TurnOutcome::Unavailable(TurnFailure {
                    error: SERVICE_UNAVAILABLE.to_string(),
                    metrics,
                })
            }
        }
    }

    /// Convert a fallback cause into a degradation event and record it.
    fn degrade(&self, metrics: &mut TurnMetrics, subsystem: Subsystem, cause: FallbackCause) {
        let kind = match &cause {
            FallbackCause::Timeout { .. } => DegradationKind::Timeout,
            FallbackCause::Error(_) => DegradationKind::Error,
        };
        self.record(
            metrics,
            DegradationEvent::new(subsystem, kind, cause.to_string()),
        );
    }

    /// Record one degradation event in the metrics and the sink.
    fn record(&self, metrics: &mut TurnMetrics, event: DegradationEvent) {
        self.telemetry.record_degradation(&event);
        metrics.record(event);
    }

    /// Fill in latency and budget figures, settle the terminal status, and
    /// emit the metrics exactly once.
    fn finalize(
        &self,
        metrics: &mut TurnMetrics,
        allocator: &kindred_core::budget::BudgetAllocator,
        started: Instant,
        fatal: Option<TurnStatus>,
    ) {
        let report = allocator.report();
        metrics.total_latency_ms = started.elapsed().as_millis() as u64;
        metrics.tokens_used = report.used;
        metrics.budget_utilization_pct = report.utilization_pct;
        if let Some(status) = fatal {
            metrics.status = status;
        }
        metrics.finalize_status();
        self.telemetry.log_turn(metrics);
    }
}
