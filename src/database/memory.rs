use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{StoreError, User, UserId, UserStore, UserUpdate};

/// DashMap-backed user storage. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryUserStore {
    users: DashMap<UserId, User>,
    usernames: DashMap<String, UserId>,
    next_id: AtomicU64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, username: &str, password_hash: String) -> Result<User, StoreError> {
        // Holding the username entry makes the uniqueness check and the insert atomic.
        let slot = match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => return Err(StoreError::UsernameTaken(username.to_string())),
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
            last_login: None,
            last_reward: None,
            reward_streak: 0,
            coins: 0,
        };
        self.users.insert(id, user.clone());
        slot.insert(id);

        tracing::debug!(user_id = id, %username, "User created");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Option<User> {
        let id = *self.usernames.get(username)?;
        self.users.get(&id).map(|user| user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|user| user.clone())
    }

    async fn update_user(&self, id: UserId, update: UserUpdate<'_>) -> Result<User, StoreError> {
        let mut stored = self.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let username = stored.username.clone();
        let user = stored.value_mut();
        update(user);
        user.id = id;
        user.username = username;
        Ok(user.clone())
    }

    async fn user_count(&self) -> usize {
        self.users.len()
    }
}
