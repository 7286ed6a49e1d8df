use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::database::{create_store, DatabaseConfig, UserStore};
use crate::hub::Hub;
use crate::rewards::RewardPolicy;

/// Shared state handed to every HTTP and WebSocket handler.
pub struct GameServer {
    config: Config,
    hub: Hub,
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    rewards: RewardPolicy,
}

impl GameServer {
    /// Builds the server state and starts the hub's coordinating task.
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config, database: DatabaseConfig) -> anyhow::Result<Arc<Self>> {
        let tokens = TokenService::from_config(&config.security)?;
        Ok(Self::with_parts(
            config.clone(),
            Hub::spawn(config.hub.clone()),
            create_store(database),
            tokens,
        ))
    }

    pub fn with_parts(
        config: Config,
        hub: Hub,
        users: Arc<dyn UserStore>,
        tokens: TokenService,
    ) -> Arc<Self> {
        let rewards = RewardPolicy::new(&config.rewards);
        Arc::new(Self {
            config,
            hub,
            users,
            tokens,
            rewards,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn rewards(&self) -> &RewardPolicy {
        &self.rewards
    }
}
