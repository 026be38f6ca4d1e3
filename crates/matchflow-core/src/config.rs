//! Engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Transient auth failures on the existence check before it is skipped.
pub const DEFAULT_AUTH_FAILURE_THRESHOLD: u32 = 3;
/// Age below which an existing Proposal is treated as a concurrent creation.
pub const DEFAULT_RACE_WINDOW_SECS: i64 = 5;
/// Archived sessions returned by a history listing.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchflowConfig {
    #[serde(default)]
    pub resilience: ResilienceSettings,
    #[serde(default)]
    pub promotion: PromotionSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

impl MatchflowConfig {
    pub fn race_window(&self) -> Duration {
        Duration::seconds(self.promotion.race_window_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResilienceSettings {
    #[serde(default = "default_auth_failure_threshold")]
    pub auth_failure_threshold: u32,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            auth_failure_threshold: DEFAULT_AUTH_FAILURE_THRESHOLD,
        }
    }
}

/// The race window is a tuning knob, not a correctness bound. Revisit it if
/// store write latency ever approaches the configured value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PromotionSettings {
    #[serde(default = "default_race_window_secs")]
    pub race_window_secs: i64,
}

impl Default for PromotionSettings {
    fn default() -> Self {
        Self {
            race_window_secs: DEFAULT_RACE_WINDOW_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn default_auth_failure_threshold() -> u32 {
    DEFAULT_AUTH_FAILURE_THRESHOLD
}

fn default_race_window_secs() -> i64 {
    DEFAULT_RACE_WINDOW_SECS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
