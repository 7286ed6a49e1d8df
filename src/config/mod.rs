//! Configuration module.
//!
//! Layered JSON configuration with environment overrides and defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`hub`]: Real-time hub and WebSocket framing settings
//! - [`security`]: CORS and access token settings
//! - [`rewards`]: Daily reward tuning
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

pub mod defaults;
pub mod hub;
pub mod loader;
pub mod logging;
pub mod rewards;
pub mod security;
pub mod types;
pub mod validation;

pub use hub::HubConfig;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use rewards::RewardConfig;

pub use security::SecurityConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.hub.mailbox_capacity, 256);
        assert_eq!(config.hub.command_buffer, 1024);
        assert_eq!(config.hub.max_message_size, 65536);
        assert!(!config.hub.announce_presence);

        assert_eq!(config.security.cors_origins, "*");
        assert!(config.security.jwt_secret.is_none());
        assert_eq!(config.security.token_ttl_secs, 86_400);

        assert_eq!(config.rewards.base_reward, 100);
        assert_eq!(config.rewards.streak_bonus, 10);
        assert_eq!(config.rewards.cooldown_secs, 86_400);
        assert_eq!(config.rewards.streak_window_secs, 172_800);

        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.rotation, "daily");
    }

    #[test]
    fn test_config_partial_document_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"port": 9000, "hub": {"mailbox_capacity": 16}}"#).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.hub.mailbox_capacity, 16);
        assert_eq!(config.hub.command_buffer, 1024);
        assert_eq!(config.rewards, RewardConfig::default());
    }

    #[test]
    fn test_logging_level_is_lenient() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"level": "WARNING"}"#).unwrap();
        assert_eq!(logging.level, Some(LogLevel::Warn));

        let logging: LoggingConfig = serde_json::from_str(r#"{"level": ["debug"]}"#).unwrap();
        assert_eq!(logging.level, Some(LogLevel::Debug));

        let logging: LoggingConfig = serde_json::from_str(r#"{"level": "loud"}"#).unwrap();
        assert_eq!(logging.level, None);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::parse("err"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
