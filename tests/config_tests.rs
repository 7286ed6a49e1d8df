//! Environment-driven configuration loading. These tests mutate process
//! environment variables, so they run serially.

use mrpg_server::config::{self, Config, LogFormat};
use std::env;

const MANAGED_VARS: &[&str] = &[
    "MRPG_ENV",
    "MRPG_CONFIG_JSON",
    "MRPG__PORT",
    "MRPG__HUB__MAILBOX_CAPACITY",
    "MRPG__SECURITY__JWT_SECRET",
];

fn clear_env() {
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial_test::serial]
fn test_load_without_sources_uses_defaults() {
    clear_env();
    let cfg = config::load();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.hub.mailbox_capacity, 256);
    assert_eq!(cfg.logging.format, LogFormat::Text);
    assert!(config::validate_config(&cfg).is_ok());
}

#[test]
#[serial_test::serial]
fn test_json_env_then_field_overrides() {
    clear_env();
    env::set_var(
        "MRPG_CONFIG_JSON",
        r#"{"port": 9000, "hub": {"mailbox_capacity": 32}, "logging": {"format": "json"}}"#,
    );
    env::set_var("MRPG__HUB__MAILBOX_CAPACITY", "64");

    let cfg = config::load();
    clear_env();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.hub.mailbox_capacity, 64);
    assert_eq!(cfg.logging.format, LogFormat::Json);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.rewards.base_reward, 100);
}

#[test]
#[serial_test::serial]
fn test_malformed_json_env_is_skipped() {
    clear_env();
    env::set_var("MRPG_CONFIG_JSON", "{ not json");
    env::set_var("MRPG__PORT", "7000");

    let cfg = config::load();
    clear_env();

    assert_eq!(cfg.port, 7000);
}

#[test]
#[serial_test::serial]
fn test_production_requires_strong_secret() {
    clear_env();
    env::set_var("MRPG_ENV", "production");

    let missing = Config::default();
    assert!(config::validate_config(&missing).is_err());

    let mut short = Config::default();
    short.security.jwt_secret = Some("short".to_string());
    assert!(config::validate_config(&short).is_err());

    let mut strong = Config::default();
    strong.security.jwt_secret = Some("x".repeat(48));
    let result = config::validate_config(&strong);
    clear_env();

    assert!(result.is_ok());
}

#[test]
#[serial_test::serial]
fn test_short_secret_is_allowed_outside_production() {
    clear_env();
    let mut cfg = Config::default();
    cfg.security.jwt_secret = Some("short".to_string());
    assert!(!config::is_production_mode());
    assert!(config::validate_config(&cfg).is_ok());
}

#[test]
fn test_config_roundtrip_serialization() {
    let cfg = Config::default();
    let json = serde_json::to_string_pretty(&cfg).expect("serialization should succeed");
    let parsed: Config = serde_json::from_str(&json).expect("deserialization should succeed");
    assert_eq!(parsed.port, cfg.port);
    assert_eq!(parsed.hub, cfg.hub);
    assert_eq!(parsed.rewards.cooldown_secs, cfg.rewards.cooldown_secs);
}
