//! User record storage.
//!
//! The server talks to storage only through the [`UserStore`] trait; the
//! in-memory backend is the one shipped.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use memory::InMemoryUserStore;

pub type UserId = u64;

/// In-place mutation applied atomically to one stored user.
pub type UserUpdate<'a> = Box<dyn FnOnce(&mut User) + Send + 'a>;

/// A registered player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_reward: Option<DateTime<Utc>>,
    pub reward_streak: u32,
    pub coins: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username `{0}` is already taken")]
    UsernameTaken(String),
    #[error("User {0} not found")]
    NotFound(UserId),
}

/// Storage abstraction for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user with a unique username. Fails with `UsernameTaken` when
    /// the name is already registered, even under concurrent registration.
    async fn create_user(&self, username: &str, password_hash: String) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Option<User>;

    async fn find_by_id(&self, id: UserId) -> Option<User>;

    /// Apply `update` while no other update of the same user can interleave,
    /// returning the stored result. `id` and `username` are not changeable.
    async fn update_user(&self, id: UserId, update: UserUpdate<'_>) -> Result<User, StoreError>;

    /// Stamp a successful login.
    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<User, StoreError> {
        self.update_user(id, Box::new(move |user: &mut User| user.last_login = Some(at)))
            .await
    }

    /// Number of registered users
    async fn user_count(&self) -> usize;
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatabaseConfig {
    #[default]
    InMemory,
}

pub fn create_store(config: DatabaseConfig) -> Arc<dyn UserStore> {
    match config {
        DatabaseConfig::InMemory => Arc::new(InMemoryUserStore::new()),
    }
}
