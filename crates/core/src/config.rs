//! Engine tunables.

use chrono::Duration;

use crate::schedule::{DEFAULT_COOLDOWN_MINUTES, MAX_COOLDOWN_MINUTES};

/// Settings the engine reads on every evaluation.
#[derive(Debug, Clone)]
pub struct NudgeConfig {
    /// Cooldown window between two successful dispatches.
    pub cooldown_minutes: i64,
    /// Public base URL used for the "manage settings" link.
    pub app_url: String,
}

impl NudgeConfig {
    /// Cooldown as a duration, clamped to `0..=MAX_COOLDOWN_MINUTES`.
    pub fn cooldown(&self) -> Duration {
        Duration::minutes(self.cooldown_minutes.clamp(0, MAX_COOLDOWN_MINUTES))
    }
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            app_url: "http://localhost:3000".to_string(),
        }
    }
}
