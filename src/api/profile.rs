use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::AuthenticatedUser;
use crate::database::{User, UserId};
use crate::rewards::{RewardGrant, RewardStatus};
use crate::server::GameServer;

/// Public view of the caller's account.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub username: String,
    pub coins: i64,
    pub reward_streak: u32,
    pub last_reward: Option<DateTime<Utc>>,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            coins: user.coins,
            reward_streak: user.reward_streak,
            last_reward: user.last_reward,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub message: &'static str,
    pub reward: RewardGrant,
}

pub async fn profile(
    State(server): State<Arc<GameServer>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = server
        .users()
        .find_by_id(identity.user_id)
        .await
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(ProfileResponse { user: user.into() }))
}

pub async fn reward_status(
    State(server): State<Arc<GameServer>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<RewardStatus>, ApiError> {
    let user = server
        .users()
        .find_by_id(identity.user_id)
        .await
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(server.rewards().status(&user, Utc::now())))
}

pub async fn claim_reward(
    State(server): State<Arc<GameServer>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<ClaimResponse>, ApiError> {
    let now = Utc::now();
    let policy = server.rewards();
    let mut outcome = None;

    server
        .users()
        .update_user(
            identity.user_id,
            Box::new(|user: &mut User| outcome = Some(policy.claim(user, now))),
        )
        .await
        .map_err(|_| ApiError::UserNotFound)?;

    let reward = outcome
        .ok_or_else(|| ApiError::Internal("reward claim was not applied".to_string()))??;
    tracing::info!(
        user_id = identity.user_id,
        total_reward = reward.total_reward,
        streak = reward.new_streak,
        "Daily reward claimed"
    );

    Ok(Json(ClaimResponse {
        message: "Daily reward claimed successfully",
        reward,
    }))
}
