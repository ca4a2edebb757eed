//! `kindred doctor` — validate configuration before anything runs.

use anyhow::Context;
use kindred_config::RuntimeConfig;
use std::path::Path;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = RuntimeConfig::load(config_path).context("loading configuration")?;
    config.validate().context("validating configuration")?;

    let allocator = config.budget.allocator();
    println!("Configuration OK ({})", config_path.display());
    println!(
        "  capacity ceiling : {} tokens (context {}, reserved {}, buffer {})",
        allocator.ceiling(),
        config.budget.total_context,
        config.budget.reserved_output,
        config.budget.safety_buffer_fraction,
    );
    println!(
        "  timeouts         : identity {}ms, mood {}ms, memory {}ms",
        config.timeouts.identity_ms, config.timeouts.mood_ms, config.timeouts.memory_ms,
    );
    println!(
        "  backend          : {} ({}, model {})",
        config.backend.provider, config.backend.base_url, config.backend.model,
    );
    println!(
        "  identity store   : {}",
        config
            .identity
            .snapshot_dir
            .as_deref()
            .unwrap_or("<skeleton only>"),
    );

    Ok(())
}
