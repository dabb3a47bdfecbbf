use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::store::{ProfileStore, StoreError};
use crate::models::{Block, BlockCollection, Profile, UserRef};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        display_name TEXT,
        bio TEXT,
        avatar TEXT,
        avatar_asset TEXT,
        blocks JSONB NOT NULL DEFAULT '[]'::jsonb,
        version BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: Uuid,
    display_name: Option<String>,
    bio: Option<String>,
    avatar: Option<String>,
    avatar_asset: Option<String>,
    blocks: Json<Vec<Block>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self, username: &str) -> Profile {
        Profile {
            user: self.user_id,
            username: username.to_string(),
            display_name: self.display_name,
            bio: self.bio,
            avatar: self.avatar,
            avatar_asset: self.avatar_asset,
            blocks: BlockCollection::from(self.blocks.0),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Postgres-backed store. Blocks live in one JSONB array per profile so
/// their order is preserved by the column itself.
pub struct PgProfileStore {
    db: Arc<DatabaseManager>,
}

impl PgProfileStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Create the users and profiles tables if they are missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let pool = self.db.pool().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!("Profile schema ready");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserRef>, StoreError> {
        let pool = self.db.pool().await?;

        let row = sqlx::query_as::<_, UserRow>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&pool)
            .await?;

        Ok(row.map(|row| UserRef {
            id: row.id,
            username: row.username,
        }))
    }

    async fn find_profile(&self, user: &UserRef) -> Result<Option<Profile>, StoreError> {
        let pool = self.db.pool().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, display_name, bio, avatar, avatar_asset, blocks, version, created_at, updated_at
             FROM profiles
             WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(|row| row.into_profile(&user.username)))
    }

    async fn create_profile(&self, user: &UserRef) -> Result<Profile, StoreError> {
        let pool = self.db.pool().await?;

        let inserted = sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user.id)
            .execute(&pool)
            .await?;

        if inserted.rows_affected() > 0 {
            info!("Initial profile created for user: {}", user.username);
        }

        self.find_profile(user)
            .await?
            .ok_or_else(|| StoreError::MissingAfterCreate(user.username.clone()))
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let pool = self.db.pool().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            "UPDATE profiles
             SET display_name = $2, bio = $3, avatar = $4, avatar_asset = $5, blocks = $6,
                 version = version + 1, updated_at = now()
             WHERE user_id = $1 AND version = $7
             RETURNING user_id, display_name, bio, avatar, avatar_asset, blocks, version, created_at, updated_at",
        )
        .bind(profile.user)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.avatar)
        .bind(&profile.avatar_asset)
        .bind(Json(profile.blocks.as_slice()))
        .bind(profile.version)
        .fetch_optional(&pool)
        .await?;

        row.map(|row| row.into_profile(&profile.username))
            .ok_or_else(|| StoreError::VersionConflict(profile.username.clone()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(self.db.health_check().await?)
    }
}
