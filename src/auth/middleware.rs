//! Request authentication for protected routes.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;
use std::sync::Arc;

use super::error::AuthError;
use crate::api::ApiError;
use crate::hub::UserIdentity;
use crate::server::GameServer;

/// The authenticated caller of a request.
///
/// The token is read from `Authorization: Bearer <token>`, or from the
/// `token` query parameter for WebSocket upgrades where browsers cannot set
/// headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserIdentity);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<Arc<GameServer>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        server: &Arc<GameServer>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or(AuthError::MissingToken)?;

        let claims = server.tokens().verify(&token)?;
        Ok(Self(claims.identity()?))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn query_token(parts: &Parts) -> Option<String> {
    let Query(query) = Query::<TokenQuery>::try_from_uri(&parts.uri).ok()?;
    query.token.filter(|token| !token.is_empty())
}
