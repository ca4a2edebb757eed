//! `kindred turn` — run one conversation turn against the configured stack.

use anyhow::Context;
use kindred_affect::InMemoryMoodTracker;
use kindred_config::RuntimeConfig;
use kindred_core::identity::{FileIdentityStore, IdentityStore, StaticIdentityStore};
use kindred_memory::KeywordRecall;
use kindred_telemetry::TracingRecorder;
use kindred_turn::{TurnOutcome, TurnPipeline, TurnRequest};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub async fn run(
    config_path: &Path,
    message: String,
    user: String,
    session: Option<String>,
    show_metrics: bool,
) -> anyhow::Result<()> {
    let config = RuntimeConfig::load(config_path).context("loading configuration")?;

    let identity: Arc<dyn IdentityStore> = match &config.identity.snapshot_dir {
        Some(dir) => Arc::new(FileIdentityStore::new(dir)),
        None => Arc::new(StaticIdentityStore::skeleton()),
    };
    let backend = kindred_providers::from_config(&config.backend);

    let pipeline = TurnPipeline::new(
        &config,
        identity,
        Arc::new(InMemoryMoodTracker::new()),
        Arc::new(KeywordRecall::new()),
        backend,
        Arc::new(TracingRecorder::new()),
    )
    .context("validating configuration")?;

    let session = session.unwrap_or_else(|| Uuid::new_v4().to_string());
    let outcome = pipeline
        .process_turn(TurnRequest::new(user, session, message))
        .await;

    if show_metrics {
        eprintln!("{}", serde_json::to_string_pretty(outcome.metrics())?);
    }

    match outcome {
        TurnOutcome::Completed(success) => {
            println!("{}", success.response);
            Ok(())
        }
        TurnOutcome::Unavailable(failure) => {
            anyhow::bail!("{}", failure.error)
        }
    }
}
