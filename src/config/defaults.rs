//! Default value functions for configuration fields.
//!
//! Used by the `#[serde(default = ...)]` attributes across the configuration
//! types, grouped by section.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    8080
}

// =============================================================================
// Hub Defaults
// =============================================================================

pub const fn default_mailbox_capacity() -> usize {
    256
}

pub const fn default_command_buffer() -> usize {
    1024
}

pub const fn default_max_message_size() -> usize {
    65536 // 64KB
}

pub const fn default_announce_presence() -> bool {
    false
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_token_ttl_secs() -> u64 {
    86_400 // 24 hours
}

pub const fn default_min_password_length() -> usize {
    6
}

// =============================================================================
// Reward Defaults
// =============================================================================

pub const fn default_base_reward() -> i64 {
    100
}

pub const fn default_streak_bonus() -> i64 {
    10
}

pub const fn default_reward_cooldown_secs() -> u64 {
    86_400 // 24 hours
}

pub const fn default_streak_window_secs() -> u64 {
    172_800 // 48 hours
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "mrpg-server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
