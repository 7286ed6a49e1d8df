//! HS256 access tokens.

use chrono::{DateTime, Utc};
use getrandom::fill as fill_random;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::AuthError;
use crate::config::SecurityConfig;
use crate::database::{User, UserId};
use crate::hub::UserIdentity;

/// Access token claims. `sub` carries the numeric user id as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn identity(&self) -> Result<UserIdentity, AuthError> {
        Ok(UserIdentity {
            user_id: self.user_id()?,
            username: self.username.clone(),
        })
    }
}

/// Issues and verifies access tokens with one shared secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Uses the configured secret, or a random one that only lives as long as
    /// this process.
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        let configured = config
            .jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty());

        match configured {
            Some(secret) => Ok(Self::new(secret.as_bytes(), config.token_ttl_secs)),
            None => {
                let mut secret = [0u8; 32];
                fill_random(&mut secret).map_err(|e| AuthError::TokenIssue(e.to_string()))?;
                tracing::warn!(
                    "No JWT secret configured; generated an ephemeral one. Tokens will not survive a restart"
                );
                Ok(Self::new(&secret, config.token_ttl_secs))
            }
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}
