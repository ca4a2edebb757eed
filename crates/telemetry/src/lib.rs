//! Turn observability for Kindred.
//!
//! Write-only and off the correctness-critical path: the pipeline emits
//! [`DegradationEvent`]s as subsystems fall back and one [`TurnMetrics`]
//! record when the turn finishes; a [`TelemetrySink`] carries both away.
//! Nothing here can fail a turn.

pub mod model;
pub mod recorder;

pub use model::{DegradationEvent, DegradationKind, Subsystem, TurnMetrics, TurnStatus};
pub use recorder::{MemoryRecorder, TelemetrySink, TracingRecorder};
