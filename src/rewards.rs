//! Daily reward rule.
//!
//! A reward can be claimed once per cooldown period. Claiming within the
//! streak window of the previous claim extends the streak; claiming later
//! resets it first. Pure functions over `now` so callers control the clock.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::RewardConfig;
use crate::database::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardStatus {
    pub can_claim: bool,
    /// `None` until the first claim.
    pub next_reward: Option<DateTime<Utc>>,
    pub streak: u32,
}

/// Outcome of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardGrant {
    pub base_reward: i64,
    pub streak_bonus: i64,
    pub total_reward: i64,
    pub new_balance: i64,
    pub new_streak: u32,
    pub next_reward: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RewardError {
    #[error("Cannot claim reward yet")]
    NotYet { next_reward: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub struct RewardPolicy {
    base_reward: i64,
    streak_bonus: i64,
    cooldown: Duration,
    streak_window: Duration,
}

impl RewardPolicy {
    pub fn new(config: &RewardConfig) -> Self {
        Self {
            base_reward: config.base_reward,
            streak_bonus: config.streak_bonus,
            cooldown: seconds(config.cooldown_secs),
            streak_window: seconds(config.streak_window_secs),
        }
    }

    pub fn status(&self, user: &User, now: DateTime<Utc>) -> RewardStatus {
        let next_reward = user.last_reward.map(|last| last + self.cooldown);
        RewardStatus {
            can_claim: next_reward.is_none_or(|next| now >= next),
            next_reward,
            streak: user.reward_streak,
        }
    }

    /// Applies a claim to `user` in place. The caller persists the result.
    pub fn claim(&self, user: &mut User, now: DateTime<Utc>) -> Result<RewardGrant, RewardError> {
        if let Some(last) = user.last_reward {
            let next_reward = last + self.cooldown;
            if now < next_reward {
                return Err(RewardError::NotYet { next_reward });
            }
            if now > last + self.streak_window {
                user.reward_streak = 0;
            }
        }

        let streak_bonus = i64::from(user.reward_streak).saturating_mul(self.streak_bonus);
        let total_reward = self.base_reward.saturating_add(streak_bonus);

        user.coins = user.coins.saturating_add(total_reward);
        user.reward_streak = user.reward_streak.saturating_add(1);
        user.last_reward = Some(now);

        Ok(RewardGrant {
            base_reward: self.base_reward,
            streak_bonus,
            total_reward,
            new_balance: user.coins,
            new_streak: user.reward_streak,
            next_reward: now + self.cooldown,
        })
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::new(&RewardConfig::default())
    }
}

/// Upper bound on configured periods so date arithmetic cannot overflow.
const MAX_PERIOD_SECS: u64 = 10 * 365 * 86_400;

fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_PERIOD_SECS) as i64)
}
