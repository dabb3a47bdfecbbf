use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::store::{ProfileStore, StoreError};
use crate::models::{Profile, UserRef};

/// In-process store with the same contract as the Postgres one.
/// Used for local development and tests.
#[derive(Default)]
pub struct MemoryProfileStore {
    users: RwLock<HashMap<String, UserRef>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, returning its reference. Re-registering a username
    /// returns the existing user.
    pub async fn insert_user(&self, username: &str) -> UserRef {
        let mut users = self.users.write().await;
        users
            .entry(username.to_string())
            .or_insert_with(|| UserRef {
                id: Uuid::new_v4(),
                username: username.to_string(),
            })
            .clone()
    }

    pub async fn with_users(usernames: &[&str]) -> Self {
        let store = Self::new();
        for username in usernames {
            store.insert_user(username).await;
        }
        store
    }

    pub async fn profile_count(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserRef>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_profile(&self, user: &UserRef) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(&user.id).cloned())
    }

    async fn create_profile(&self, user: &UserRef) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles
            .entry(user.id)
            .or_insert_with(|| Profile::empty(user))
            .clone())
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let stored = profiles
            .get_mut(&profile.user)
            .ok_or_else(|| StoreError::Corrupt(format!("no profile row for '{}'", profile.username)))?;

        if stored.version != profile.version {
            return Err(StoreError::VersionConflict(profile.username.clone()));
        }

        let mut next = profile.clone();
        next.version = profile.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, BlockKind};

    #[tokio::test]
    async fn create_profile_is_idempotent() {
        let store = MemoryProfileStore::new();
        let alice = store.insert_user("alice").await;

        let first = store.create_profile(&alice).await.unwrap();
        let mut changed = first.clone();
        changed.bio = Some("hello".to_string());
        store.save(&changed).await.unwrap();

        let second = store.create_profile(&alice).await.unwrap();
        assert_eq!(second.bio.as_deref(), Some("hello"));
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn save_rejects_stale_version() {
        let store = MemoryProfileStore::new();
        let alice = store.insert_user("alice").await;
        let read_a = store.create_profile(&alice).await.unwrap();
        let read_b = read_a.clone();

        let mut write_a = read_a;
        write_a.blocks.push(Block::new("1", BlockKind::Text));
        let saved = store.save(&write_a).await.unwrap();
        assert_eq!(saved.version, 1);

        let mut write_b = read_b;
        write_b.blocks.push(Block::new("2", BlockKind::Text));
        assert!(matches!(store.save(&write_b).await, Err(StoreError::VersionConflict(_))));

        let stored = store.find_profile(&alice).await.unwrap().unwrap();
        assert_eq!(stored.blocks.len(), 1);
        assert_eq!(stored.blocks.get("1").map(|b| b.id.as_str()), Some("1"));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = MemoryProfileStore::with_users(&["alice"]).await;
        assert!(store.find_user("alice").await.unwrap().is_some());
        assert!(store.find_user("Alice").await.unwrap().is_none());
    }
}
