use async_trait::async_trait;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::models::{Profile, UserRef};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Profile for '{0}' was modified concurrently")]
    VersionConflict(String),

    #[error("Profile for '{0}' vanished after creation")]
    MissingAfterCreate(String),

    #[error("Stored profile is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Persistence of the Profile aggregate, one per user
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Resolve a user by exact username
    async fn find_user(&self, username: &str) -> Result<Option<UserRef>, StoreError>;

    async fn find_profile(&self, user: &UserRef) -> Result<Option<Profile>, StoreError>;

    /// Create an empty profile for `user`, or return the existing one
    async fn create_profile(&self, user: &UserRef) -> Result<Profile, StoreError>;

    /// Compare-and-swap on `profile.version`. Returns the stored aggregate
    /// with the bumped version, or `VersionConflict` if the stored version
    /// moved since `profile` was read.
    async fn save(&self, profile: &Profile) -> Result<Profile, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
