use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::block_collection::BlockCollection;

/// Identity of an owning user. Users are managed elsewhere; only the id and
/// username are consumed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

/// The per-user aggregate: display metadata plus the ordered block collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    /// Object name of the stored avatar, used when replaced avatars are deleted
    #[serde(skip)]
    pub avatar_asset: Option<String>,
    pub blocks: BlockCollection,
    /// Optimistic concurrency token, bumped on every save
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh, never persisted profile with no blocks
    pub fn empty(user: &UserRef) -> Self {
        let now = Utc::now();
        Self {
            user: user.id,
            username: user.username.clone(),
            display_name: None,
            bio: None,
            avatar: None,
            avatar_asset: None,
            blocks: BlockCollection::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
