//! Configuration constants and the engine configuration block.

use serde::{Deserialize, Serialize};

/// Multiplier applied to the overlap depth when pushing a kinetic box out of
/// a solid one. Values above 1.0 leave a gap so the pair no longer touches.
pub const DEFAULT_SEPARATION_FACTOR: f32 = 1.1;

/// Wall-clock budget for a single `update` call, in milliseconds.
pub const DEFAULT_TICK_BUDGET_MS: f32 = 2.0;

/// Tunables for [`crate::CollisionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub separation_factor: f32,
    pub tick_budget_ms: f32,
    /// Emit a debug summary of every tick through `log`.
    pub report_ticks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separation_factor: DEFAULT_SEPARATION_FACTOR,
            tick_budget_ms: DEFAULT_TICK_BUDGET_MS,
            report_ticks: false,
        }
    }
}

impl EngineConfig {
    /// Replaces unusable values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.separation_factor.is_finite() || self.separation_factor <= 0.0 {
            self.separation_factor = DEFAULT_SEPARATION_FACTOR;
        }
        if !self.tick_budget_ms.is_finite() || self.tick_budget_ms <= 0.0 {
            self.tick_budget_ms = DEFAULT_TICK_BUDGET_MS;
        }
        self
    }
}
