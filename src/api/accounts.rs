use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::{hash_password, verify_password, AuthError};
use crate::database::User;
use crate::server::GameServer;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LENGTH: usize = 32;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(server): State<Arc<GameServer>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = validate_username(&credentials.username)?;
    let min_length = server.config().security.min_password_length;
    if credentials.password.chars().count() < min_length {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {min_length} characters"
        )));
    }

    let password = credentials.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| ApiError::Internal(format!("hashing task failed: {err}")))??;

    let user = server.users().create_user(username, password_hash).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

pub async fn login(
    State(server): State<Arc<GameServer>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = server
        .users()
        .find_by_username(credentials.username.trim())
        .await
    else {
        tracing::debug!(username = %credentials.username, "Login for unknown user");
        return Err(AuthError::InvalidCredentials.into());
    };

    let password = credentials.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|err| ApiError::Internal(format!("verification task failed: {err}")))?;
    if !valid {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = server.users().record_login(user.id, Utc::now()).await?;
    let token = server.tokens().issue(&user)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

fn validate_username(raw: &str) -> Result<&str, ApiError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed() {
        assert_eq!(validate_username("  alice ").unwrap(), "alice");
    }

    #[test]
    fn blank_and_oversized_usernames_are_rejected() {
        assert!(matches!(
            validate_username("   "),
            Err(ApiError::BadRequest(_))
        ));
        let long = "x".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(matches!(
            validate_username(&long),
            Err(ApiError::BadRequest(_))
        ));
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LENGTH)).is_ok());
    }
}
