//! Token budget allocation — the capacity contract for one turn.
//!
//! A [`BudgetAllocator`] tracks a hard capacity ceiling derived from the
//! deployment's context window and grants or refuses token allocations for
//! named prompt components. The ceiling is never exceeded: an allocation
//! either fully commits or fully fails, leaving the counters untouched.
//!
//! One allocator is constructed fresh per turn and owned exclusively by that
//! turn. `allocate` takes `&mut self`, so the single-owner discipline is
//! enforced by the borrow checker rather than a lock; anything sharing an
//! allocator across tasks must add its own synchronization.

use crate::error::BudgetError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// The smallest capacity ceiling a deployment can run with. Below this no
/// usable turn could be assembled, so construction fails outright.
pub const MIN_VIABLE_CEILING: usize = 1000;

/// Tracks a capacity ceiling and running usage for a single turn.
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    /// Maximum formatted tokens available to all prompt components.
    ceiling: usize,
    /// Tokens committed so far. Monotonically non-decreasing.
    used: usize,
    /// Per-component grants. Insertion order is irrelevant.
    allocations: HashMap<String, usize>,
}

impl BudgetAllocator {
    /// Derive the capacity ceiling and build a fresh allocator.
    ///
    /// `ceiling = floor(total_context × safety_buffer_fraction) − reserved_output`.
    /// With the stock deployment parameters (128000, 8000, 0.85) that is
    /// 100800 tokens. Construction fails if the derived ceiling falls below
    /// [`MIN_VIABLE_CEILING`] — a process-level misconfiguration, not a
    /// per-turn condition.
    pub fn new(
        total_context: usize,
        reserved_output: usize,
        safety_buffer_fraction: f64,
    ) -> Result<Self, BudgetError> {
        let buffered = (total_context as f64 * safety_buffer_fraction).floor() as i64;
        let ceiling = buffered - reserved_output as i64;

        if ceiling < MIN_VIABLE_CEILING as i64 {
            return Err(BudgetError::CeilingTooSmall {
                ceiling,
                minimum: MIN_VIABLE_CEILING,
            });
        }

        Ok(Self {
            ceiling: ceiling as usize,
            used: 0,
            allocations: HashMap::new(),
        })
    }

    /// Attempt to allocate `tokens` for `component`.
    ///
    /// Commits and returns `true` iff `used + tokens ≤ ceiling`. On refusal
    /// the counters are left unchanged — no partial commit — and a
    /// warning-level signal is emitted. A refusal is an ordinary outcome,
    /// never a fault.
    pub fn allocate(&mut self, component: &str, tokens: usize) -> bool {
        if self.used.saturating_add(tokens) > self.ceiling {
            warn!(
                component,
                requested = tokens,
                used = self.used,
                ceiling = self.ceiling,
                "Budget refused allocation"
            );
            return false;
        }

        self.used += tokens;
        *self.allocations.entry(component.to_string()).or_insert(0) += tokens;
        true
    }

    /// The capacity ceiling for this turn.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Tokens committed so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Tokens still available: `ceiling − used`.
    pub fn remaining(&self) -> usize {
        self.ceiling - self.used
    }

    /// Snapshot of current usage for metrics and diagnostics.
    pub fn report(&self) -> BudgetReport {
        let utilization_pct = if self.ceiling > 0 {
            (self.used as f32 / self.ceiling as f32) * 100.0
        } else {
            0.0
        };
        let mut components: Vec<ComponentUsage> = self
            .allocations
            .iter()
            .map(|(name, tokens)| ComponentUsage {
                component: name.clone(),
                tokens: *tokens,
            })
            .collect();
        // Deterministic order for logs and assertions.
        components.sort_by(|a, b| a.component.cmp(&b.component));

        BudgetReport {
            ceiling: self.ceiling,
            used: self.used,
            remaining: self.remaining(),
            utilization_pct,
            components,
        }
    }
}

/// A point-in-time usage snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReport {
    /// The capacity ceiling.
    pub ceiling: usize,
    /// Tokens committed.
    pub used: usize,
    /// Tokens still available.
    pub remaining: usize,
    /// Percentage of the ceiling committed (0.0–100.0).
    pub utilization_pct: f32,
    /// Per-component breakdown, sorted by component name.
    pub components: Vec<ComponentUsage>,
}

/// Tokens granted to a single named component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentUsage {
    pub component: String,
    pub tokens: usize,
}
