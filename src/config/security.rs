//! Security and authentication configuration types.

use super::defaults::{default_cors_origins, default_min_password_length, default_token_ttl_secs};
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins (comma-separated, or "*" for any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// HMAC secret for signing access tokens. Generated at startup when absent.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Minimum accepted password length at registration
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            min_password_length: default_min_password_length(),
        }
    }
}
