use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::rewards::RewardError;
use crate::websocket::UpgradeError;

/// Errors surfaced to HTTP clients as `{"error": "..."}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("User not found")]
    UserNotFound,
    #[error("Cannot claim reward yet")]
    RewardNotReady { next_reward: DateTime<Utc> },
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    /// Detail is logged, never returned to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl From<RewardError> for ApiError {
    fn from(err: RewardError) -> Self {
        match err {
            RewardError::NotYet { next_reward } => Self::RewardNotReady { next_reward },
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::RewardNotReady { .. } | Self::Upgrade(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::Hashing(_) | AuthError::TokenIssue(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Store(StoreError::UsernameTaken(_)) => StatusCode::CONFLICT,
            Self::Store(StoreError::NotFound(_)) | Self::UserNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::RewardNotReady { next_reward } => json!({
                "error": self.to_string(),
                "next_reward": next_reward,
            }),
            Self::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
