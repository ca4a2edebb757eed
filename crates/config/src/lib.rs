//! Configuration loading, validation, and management for Kindred.
//!
//! Loads configuration from a TOML file with environment variable overrides
//! for secrets. All settings are validated once at startup — in particular
//! the budget parameters are proven viable by constructing a throwaway
//! allocator, so per-turn allocator construction can never fail later.

use kindred_core::budget::BudgetAllocator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides the backend API key.
pub const API_KEY_ENV: &str = "KINDRED_API_KEY";

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// The root configuration structure. Fixed per deployment.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Token budget parameters.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Per-collaborator deadlines.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Generation backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Identity snapshot storage.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Budget parameters for the per-turn allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Full model context window, in tokens.
    #[serde(default = "default_total_context")]
    pub total_context: usize,

    /// Tokens held back for the generated output.
    #[serde(default = "default_reserved_output")]
    pub reserved_output: usize,

    /// Fraction of the context window the input side may use.
    #[serde(default = "default_safety_buffer_fraction")]
    pub safety_buffer_fraction: f64,
}

fn default_total_context() -> usize {
    128000
}
fn default_reserved_output() -> usize {
    8000
}
fn default_safety_buffer_fraction() -> f64 {
    0.85
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_context: default_total_context(),
            reserved_output: default_reserved_output(),
            safety_buffer_fraction: default_safety_buffer_fraction(),
        }
    }
}

impl BudgetConfig {
    /// Build the per-turn allocator from these parameters.
    ///
    /// Infallible after [`RuntimeConfig::validate`] has passed; the
    /// `expect` documents that contract rather than a reachable panic.
    pub fn allocator(&self) -> BudgetAllocator {
        BudgetAllocator::new(
            self.total_context,
            self.reserved_output,
            self.safety_buffer_fraction,
        )
        .expect("budget parameters were validated at startup")
    }
}

/// Deadlines for the bounded collaborator waits, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_identity_ms")]
    pub identity_ms: u64,

    #[serde(default = "default_mood_ms")]
    pub mood_ms: u64,

    /// Longer than identity/mood — retrieval is inherently costlier.
    #[serde(default = "default_memory_ms")]
    pub memory_ms: u64,
}

fn default_identity_ms() -> u64 {
    100
}
fn default_mood_ms() -> u64 {
    100
}
fn default_memory_ms() -> u64 {
    500
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            identity_ms: default_identity_ms(),
            mood_ms: default_mood_ms(),
            memory_ms: default_memory_ms(),
        }
    }
}

/// Generation backend settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind: "chat-completions" or "echo".
    #[serde(default = "default_backend_provider")]
    pub provider: String,

    /// Base URL for OpenAI-compatible endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; usually supplied via `KINDRED_API_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier sent to the backend.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_backend_provider() -> String {
    "echo".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_backend_provider(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("budget", &self.budget)
            .field("timeouts", &self.timeouts)
            .field("backend", &self.backend)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Identity snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    /// Directory of per-user snapshot files; `None` serves the skeleton
    /// persona to everyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides (currently the API key).
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.backend.api_key = Some(key);
            }
        }
    }

    /// Validate all settings. Runs once at process start; failures here are
    /// fatal before any turn runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.budget.safety_buffer_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(ConfigError::Invalid {
                message: format!("safety_buffer_fraction must be in (0, 1], got {fraction}"),
            });
        }

        // Prove the derived ceiling is viable by constructing an allocator.
        BudgetAllocator::new(
            self.budget.total_context,
            self.budget.reserved_output,
            fraction,
        )
        .map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;

        for (name, ms) in [
            ("timeouts.identity_ms", self.timeouts.identity_ms),
            ("timeouts.mood_ms", self.timeouts.mood_ms),
            ("timeouts.memory_ms", self.timeouts.memory_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }

        match self.backend.provider.as_str() {
            "echo" | "chat-completions" => {}
            other => {
                return Err(ConfigError::Invalid {
                    message: format!("unknown backend provider: {other}"),
                });
            }
        }

        Ok(())
    }
}
