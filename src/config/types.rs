//! Root configuration types.

use super::defaults::default_port;
use super::hub::HubConfig;
use super::logging::LoggingConfig;
use super::rewards::RewardConfig;
use super::security::SecurityConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for the game server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            hub: HubConfig::default(),
            security: SecurityConfig::default(),
            rewards: RewardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
