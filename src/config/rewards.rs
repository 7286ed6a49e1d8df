//! Daily reward configuration types.

use super::defaults::{
    default_base_reward, default_reward_cooldown_secs, default_streak_bonus,
    default_streak_window_secs,
};
use serde::{Deserialize, Serialize};

/// Tuning for the daily reward claim.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RewardConfig {
    /// Coins granted on every claim
    #[serde(default = "default_base_reward")]
    pub base_reward: i64,
    /// Extra coins per day of current streak
    #[serde(default = "default_streak_bonus")]
    pub streak_bonus: i64,
    /// Seconds that must pass between two claims
    #[serde(default = "default_reward_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Seconds after the last claim past which the streak resets
    #[serde(default = "default_streak_window_secs")]
    pub streak_window_secs: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_reward: default_base_reward(),
            streak_bonus: default_streak_bonus(),
            cooldown_secs: default_reward_cooldown_secs(),
            streak_window_secs: default_streak_window_secs(),
        }
    }
}
