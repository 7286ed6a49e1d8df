use thiserror::Error;

/// Authentication errors raised while hashing credentials or handling tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token required")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Token could not be issued: {0}")]
    TokenIssue(String),
}
