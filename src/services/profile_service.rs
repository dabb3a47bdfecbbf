use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AvatarPolicy, StorageConfig};
use crate::database::{ProfileStore, StoreError};
use crate::models::{Block, BlockInput, BlockPatch, ImageError, ImageSource, InlineImage, Profile, UserRef};
use crate::services::write_lock::KeyedLocks;
use crate::storage::{AssetClock, AssetTarget, ImageAssetUploader, UploadError};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Profile not found for user: {0}")]
    ProfileNotFound(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("Profile for '{0}' was modified concurrently")]
    Conflict(String),

    #[error("Image externalization failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Profile store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict(username) => ProfileError::Conflict(username),
            other => ProfileError::Store(other),
        }
    }
}

/// How images are named and externalized
#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub namespace: String,
    pub upload_timeout: Duration,
    pub avatar_policy: AvatarPolicy,
}

impl From<&StorageConfig> for AssetSettings {
    fn from(config: &StorageConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            upload_timeout: config.upload_timeout(),
            avatar_policy: config.avatar_policy,
        }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            namespace: "bento".to_string(),
            upload_timeout: Duration::from_secs(30),
            avatar_policy: AvatarPolicy::Overwrite,
        }
    }
}

/// Use cases over the Profile aggregate. Callers run the `AuthGuard` first;
/// this service assumes the username it is handed is authorized.
///
/// Every write holds the per-username lock for its whole read, mutate,
/// externalize and save sequence; the store's version check catches
/// writers in other processes.
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    uploader: Arc<dyn ImageAssetUploader>,
    settings: AssetSettings,
    locks: KeyedLocks,
    clock: AssetClock,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>, uploader: Arc<dyn ImageAssetUploader>, settings: AssetSettings) -> Self {
        Self {
            store,
            uploader,
            settings,
            locks: KeyedLocks::new(),
            clock: AssetClock::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Create the profile if missing and return it. Idempotent; this is the
    /// signup-time initialization hook as well.
    pub async fn ensure_profile(&self, username: &str) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        Ok(self.store.create_profile(&user).await?)
    }

    pub async fn list_blocks(&self, username: &str) -> Result<Profile, ProfileError> {
        let user = self.resolve_user(username).await?;
        self.existing_profile(&user).await
    }

    /// Append a block, creating the profile on first use. Never deduplicates.
    pub async fn add_block(&self, username: &str, input: BlockInput) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.store.create_profile(&user).await?;

        let (block, target) = self.normalize(username, input).await?;
        let uploaded: Vec<AssetTarget> = target.into_iter().collect();
        let block_id = block.id.clone();
        profile.blocks.push(block);

        let saved = self.persist(&profile, &uploaded).await?;
        info!("Block '{}' added for {} ({} blocks)", block_id, username, saved.blocks.len());
        Ok(saved)
    }

    /// Merge `patch` over the first block with the same id
    pub async fn update_block(&self, username: &str, patch: BlockPatch) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.existing_profile(&user).await?;

        let mut block = profile
            .blocks
            .get(&patch.id)
            .cloned()
            .ok_or_else(|| ProfileError::BlockNotFound(patch.id.clone()))?;

        block.merge(&patch);
        let mut uploaded = Vec::new();
        if let Some(source) = &patch.image {
            let (url, target) = self.resolve_image(username, source).await?;
            block.image_url = Some(url);
            uploaded.extend(target);
        }

        if profile.blocks.replace(block).is_err() {
            return Err(ProfileError::BlockNotFound(patch.id));
        }

        let saved = self.persist(&profile, &uploaded).await?;
        info!("Block '{}' updated for {}", patch.id, username);
        Ok(saved)
    }

    /// Discard the collection and store `inputs` in order. Each block goes
    /// through the same normalization as `add_block`.
    pub async fn replace_all_blocks(&self, username: &str, inputs: Vec<BlockInput>) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.store.create_profile(&user).await?;

        let results = join_all(inputs.into_iter().map(|input| self.normalize(username, input))).await;

        let mut blocks = Vec::with_capacity(results.len());
        let mut uploaded = Vec::new();
        let mut failure = None;
        for result in results {
            match result {
                Ok((block, target)) => {
                    blocks.push(block);
                    uploaded.extend(target);
                }
                Err(e) if failure.is_none() => failure = Some(e),
                Err(_) => {}
            }
        }
        if let Some(e) = failure {
            if !uploaded.is_empty() {
                warn!("Bulk replace for {} aborted, orphaned assets: {:?}", username, uploaded);
            }
            return Err(e);
        }

        profile.blocks.replace_all(blocks);
        let saved = self.persist(&profile, &uploaded).await?;
        info!("Blocks replaced for {} ({} blocks)", username, saved.blocks.len());
        Ok(saved)
    }

    pub async fn remove_block(&self, username: &str, block_id: &str) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.existing_profile(&user).await?;

        profile
            .blocks
            .remove(block_id)
            .ok_or_else(|| ProfileError::BlockNotFound(block_id.to_string()))?;

        let saved = self.persist(&profile, &[]).await?;
        info!("Block '{}' removed for {}", block_id, username);
        Ok(saved)
    }

    pub async fn update_display_name(&self, username: &str, value: Option<String>) -> Result<Profile, ProfileError> {
        self.update_field(username, |profile| profile.display_name = value).await
    }

    pub async fn update_bio(&self, username: &str, value: Option<String>) -> Result<Profile, ProfileError> {
        self.update_field(username, |profile| profile.bio = value).await
    }

    /// Externalize `payload` as the user's avatar and point the profile at it
    pub async fn upload_avatar(&self, username: &str, payload: &str) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.existing_profile(&user).await?;

        let image = InlineImage::parse(payload)?;
        let target = match self.settings.avatar_policy {
            AvatarPolicy::Overwrite => AssetTarget::avatar(&self.settings.namespace, username),
            AvatarPolicy::ReplaceAndDelete => {
                AssetTarget::versioned_avatar(&self.settings.namespace, username, self.clock.next_timestamp())
            }
        };
        let url = self.externalize(&image, &target).await?;

        let previous = profile.avatar_asset.replace(target.object_name.clone());
        profile.avatar = Some(url.into());
        let saved = self.persist(&profile, std::slice::from_ref(&target)).await?;
        info!("Avatar updated for {}", username);

        if self.settings.avatar_policy == AvatarPolicy::ReplaceAndDelete {
            if let Some(previous) = previous.filter(|name| *name != target.object_name) {
                let stale = AssetTarget::new(target.folder.clone(), previous);
                if let Err(e) = self.uploader.delete(&stale).await {
                    warn!("Could not delete replaced avatar {:?}: {}", stale, e);
                }
            }
        }

        Ok(saved)
    }

    async fn update_field(&self, username: &str, apply: impl FnOnce(&mut Profile)) -> Result<Profile, ProfileError> {
        let _guard = self.locks.lock(username).await;
        let user = self.resolve_user(username).await?;
        let mut profile = self.existing_profile(&user).await?;

        apply(&mut profile);
        self.persist(&profile, &[]).await
    }

    async fn resolve_user(&self, username: &str) -> Result<UserRef, ProfileError> {
        self.store
            .find_user(username)
            .await?
            .ok_or_else(|| ProfileError::UserNotFound(username.to_string()))
    }

    async fn existing_profile(&self, user: &UserRef) -> Result<Profile, ProfileError> {
        self.store
            .find_profile(user)
            .await?
            .ok_or_else(|| ProfileError::ProfileNotFound(user.username.clone()))
    }

    /// Build the persisted block, externalizing an inline image first
    async fn normalize(&self, username: &str, input: BlockInput) -> Result<(Block, Option<AssetTarget>), ProfileError> {
        let (mut block, image) = input.into_parts();
        let mut uploaded = None;
        if let Some(source) = &image {
            let (url, target) = self.resolve_image(username, source).await?;
            block.image_url = Some(url);
            uploaded = target;
        }
        Ok((block, uploaded))
    }

    /// Turn an image source into the URL to store. Returns the asset target
    /// when an upload happened.
    async fn resolve_image(&self, username: &str, source: &ImageSource) -> Result<(String, Option<AssetTarget>), ProfileError> {
        match source {
            ImageSource::Hosted { url } => Ok((ImageSource::validated_hosted_url(url)?, None)),
            ImageSource::Inline { data } => {
                let image = InlineImage::parse(data)?;
                let target = AssetTarget::block_image(&self.settings.namespace, username, self.clock.next_timestamp());
                let url = self.externalize(&image, &target).await?;
                Ok((url.into(), Some(target)))
            }
        }
    }

    async fn externalize(&self, image: &InlineImage, target: &AssetTarget) -> Result<url::Url, ProfileError> {
        match tokio::time::timeout(self.settings.upload_timeout, self.uploader.upload(image, target)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(UploadError::TimedOut(self.settings.upload_timeout).into()),
        }
    }

    /// Save, noting any externalized assets a failed save leaves behind
    async fn persist(&self, profile: &Profile, uploaded: &[AssetTarget]) -> Result<Profile, ProfileError> {
        match self.store.save(profile).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                if !uploaded.is_empty() {
                    warn!("Save failed for {} after upload, orphaned assets: {:?}", profile.username, uploaded);
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProfileStore;
    use crate::models::BlockKind;
    use crate::storage::MemoryImageUploader;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    struct Fixture {
        service: ProfileService,
        store: Arc<MemoryProfileStore>,
        uploader: Arc<MemoryImageUploader>,
    }

    async fn fixture_with(settings: AssetSettings) -> Fixture {
        let store = Arc::new(MemoryProfileStore::with_users(&["alice", "bob"]).await);
        let uploader = Arc::new(MemoryImageUploader::default());
        let service = ProfileService::new(store.clone(), uploader.clone(), settings);
        Fixture { service, store, uploader }
    }

    async fn fixture() -> Fixture {
        fixture_with(AssetSettings::default()).await
    }

    fn link(id: &str, url: &str) -> BlockInput {
        let mut block = Block::new(id, BlockKind::Link);
        block.base_url = Some(url.to_string());
        BlockInput::from(block)
    }

    fn image(id: &str, data: &str) -> BlockInput {
        let mut input = BlockInput::from(Block::new(id, BlockKind::Image));
        input.image = Some(ImageSource::Inline { data: data.to_string() });
        input
    }

    #[tokio::test]
    async fn add_block_creates_profile_lazily() {
        let f = fixture().await;
        assert_eq!(f.store.profile_count().await, 0);

        let profile = f.service.add_block("alice", link("1", "https://x.com")).await.unwrap();

        assert_eq!(profile.blocks.len(), 1);
        let block = profile.blocks.get("1").unwrap();
        assert_eq!(block.kind, BlockKind::Link);
        assert_eq!(block.base_url.as_deref(), Some("https://x.com"));
        assert_eq!(f.store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn add_block_never_deduplicates() {
        let f = fixture().await;
        f.service.add_block("alice", link("1", "https://a.com")).await.unwrap();
        let before = f.service.list_blocks("alice").await.unwrap().blocks.len();

        f.service.add_block("alice", link("1", "https://b.com")).await.unwrap();
        let profile = f.service.add_block("alice", link("1", "https://c.com")).await.unwrap();

        assert_eq!(profile.blocks.len(), before + 2);
        assert!(profile.blocks.iter().all(|b| b.id == "1"));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture().await;
        let err = f.service.add_block("carol", link("1", "https://x.com")).await.unwrap_err();
        assert!(matches!(err, ProfileError::UserNotFound(name) if name == "carol"));
    }

    #[tokio::test]
    async fn list_without_profile_is_not_found() {
        let f = fixture().await;
        assert!(matches!(f.service.list_blocks("alice").await, Err(ProfileError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn inline_images_are_externalized_before_storage() {
        let f = fixture().await;
        let profile = f.service.add_block("alice", image("img", PNG)).await.unwrap();

        let stored = profile.blocks.get("img").unwrap().image_url.clone().unwrap();
        assert!(stored.starts_with("https://assets.bento.test/bento/alice/bento_alice_"));

        let uploads = f.uploader.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].target.folder, "bento/alice");
        assert_eq!(uploads[0].media_type, "image/png");

        let reread = f.service.list_blocks("alice").await.unwrap();
        assert!(reread.blocks.iter().filter_map(|b| b.image_url.as_deref()).all(|u| !u.starts_with("data:")));
    }

    #[tokio::test]
    async fn hosted_images_are_kept_without_upload() {
        let f = fixture().await;
        let mut input = BlockInput::from(Block::new("img", BlockKind::Image));
        input.image = Some(ImageSource::Hosted { url: "https://cdn.example.com/a.png".to_string() });

        let profile = f.service.add_block("alice", input).await.unwrap();
        assert_eq!(profile.blocks.get("img").unwrap().image_url.as_deref(), Some("https://cdn.example.com/a.png"));
        assert!(f.uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_leaves_profile_untouched() {
        let f = fixture().await;
        f.service.add_block("alice", link("1", "https://x.com")).await.unwrap();
        f.uploader.set_failing(true);

        let err = f.service.add_block("alice", image("img", PNG)).await.unwrap_err();
        assert!(matches!(err, ProfileError::Upload(_)));

        let profile = f.service.list_blocks("alice").await.unwrap();
        assert_eq!(profile.blocks.len(), 1);
        assert_eq!(profile.version, 1);
    }

    #[tokio::test]
    async fn malformed_inline_payload_is_rejected() {
        let f = fixture().await;
        let err = f.service.add_block("alice", image("img", "https://not-inline.png")).await.unwrap_err();
        assert!(matches!(err, ProfileError::InvalidImage(ImageError::NotADataUri)));
        assert!(f.uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn update_block_merges_fields() {
        let f = fixture().await;
        let mut input = link("1", "https://x.com");
        input.logo = Some("x-logo".to_string());
        f.service.add_block("alice", input).await.unwrap();

        let mut patch = BlockPatch::new("1");
        patch.display_label = Some("@alice".to_string());
        let profile = f.service.update_block("alice", patch).await.unwrap();

        let block = profile.blocks.get("1").unwrap();
        assert_eq!(block.base_url.as_deref(), Some("https://x.com"));
        assert_eq!(block.logo.as_deref(), Some("x-logo"));
        assert_eq!(block.display_label.as_deref(), Some("@alice"));
        assert_eq!(block.kind, BlockKind::Link);
    }

    #[tokio::test]
    async fn update_block_externalizes_new_image_in_place() {
        let f = fixture().await;
        f.service.add_block("alice", link("a", "https://a.com")).await.unwrap();
        f.service.add_block("alice", link("b", "https://b.com")).await.unwrap();

        let mut patch = BlockPatch::new("a");
        patch.kind = Some(BlockKind::Image);
        patch.image = Some(ImageSource::Inline { data: PNG.to_string() });
        let profile = f.service.update_block("alice", patch).await.unwrap();

        let ids: Vec<_> = profile.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let block = profile.blocks.get("a").unwrap();
        assert_eq!(block.kind, BlockKind::Image);
        assert!(block.image_url.as_deref().unwrap().starts_with("https://assets.bento.test/"));
    }

    #[tokio::test]
    async fn update_unknown_block_is_not_found() {
        let f = fixture().await;
        f.service.add_block("alice", link("1", "https://x.com")).await.unwrap();

        let err = f.service.update_block("alice", BlockPatch::new("2")).await.unwrap_err();
        assert!(matches!(err, ProfileError::BlockNotFound(id) if id == "2"));
    }

    #[tokio::test]
    async fn remove_block_drops_exactly_one() {
        let f = fixture().await;
        for id in ["1", "2", "3"] {
            f.service.add_block("alice", link(id, "https://x.com")).await.unwrap();
        }

        let profile = f.service.remove_block("alice", "2").await.unwrap();
        let ids: Vec<_> = profile.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let err = f.service.remove_block("alice", "2").await.unwrap_err();
        assert!(matches!(err, ProfileError::BlockNotFound(_)));
        assert_eq!(f.service.list_blocks("alice").await.unwrap().blocks.len(), 2);
    }

    #[tokio::test]
    async fn replace_all_matches_input_exactly() {
        let f = fixture().await;
        for id in ["1", "2", "3"] {
            f.service.add_block("alice", link(id, "https://x.com")).await.unwrap();
        }

        let replacement = vec![link("9", "https://nine.com"), link("8", "https://eight.com")];
        let profile = f.service.replace_all_blocks("alice", replacement.clone()).await.unwrap();
        let expected: Vec<Block> = replacement.into_iter().map(|input| input.into_parts().0).collect();
        assert_eq!(profile.blocks.as_slice(), expected.as_slice());

        let emptied = f.service.replace_all_blocks("alice", vec![]).await.unwrap();
        assert!(emptied.blocks.is_empty());
        assert!(f.service.list_blocks("alice").await.unwrap().blocks.is_empty());
    }

    #[tokio::test]
    async fn replace_all_externalizes_inline_images_too() {
        let f = fixture().await;
        let profile = f
            .service
            .replace_all_blocks("bob", vec![image("a", PNG), link("b", "https://b.com"), image("c", PNG)])
            .await
            .unwrap();

        let ids: Vec<_> = profile.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(profile.blocks.iter().filter_map(|b| b.image_url.as_deref()).all(|u| u.starts_with("https://")));

        let uploads = f.uploader.uploads();
        assert_eq!(uploads.len(), 2);
        assert_ne!(uploads[0].target.object_name, uploads[1].target.object_name);
    }

    #[tokio::test]
    async fn field_updates_require_existing_profile() {
        let f = fixture().await;
        assert!(matches!(
            f.service.update_display_name("alice", Some("Alice".to_string())).await,
            Err(ProfileError::ProfileNotFound(_))
        ));

        f.service.ensure_profile("alice").await.unwrap();
        let profile = f.service.update_display_name("alice", Some("Alice".to_string())).await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
        let profile = f.service.update_bio("alice", Some("hi there".to_string())).await.unwrap();
        assert_eq!(profile.bio.as_deref(), Some("hi there"));
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn ensure_profile_is_idempotent() {
        let f = fixture().await;
        f.service.add_block("alice", link("1", "https://x.com")).await.unwrap();

        let profile = f.service.ensure_profile("alice").await.unwrap();
        assert_eq!(profile.blocks.len(), 1);
        assert_eq!(f.store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn avatar_overwrites_fixed_object() {
        let f = fixture().await;
        f.service.ensure_profile("alice").await.unwrap();

        f.service.upload_avatar("alice", PNG).await.unwrap();
        let profile = f.service.upload_avatar("alice", PNG).await.unwrap();

        assert_eq!(profile.avatar.as_deref(), Some("https://assets.bento.test/bento/alice/avatar"));
        let uploads = f.uploader.uploads();
        assert_eq!(uploads.len(), 2);
        assert!(uploads.iter().all(|u| u.target == AssetTarget::avatar("bento", "alice")));
        assert!(f.uploader.deletions().is_empty());
    }

    #[tokio::test]
    async fn avatar_replace_and_delete_removes_previous_asset() {
        let f = fixture_with(AssetSettings {
            avatar_policy: AvatarPolicy::ReplaceAndDelete,
            ..AssetSettings::default()
        })
        .await;
        f.service.ensure_profile("alice").await.unwrap();

        let first = f.service.upload_avatar("alice", PNG).await.unwrap();
        let second = f.service.upload_avatar("alice", PNG).await.unwrap();
        assert_ne!(first.avatar, second.avatar);

        let uploads = f.uploader.uploads();
        let deletions = f.uploader.deletions();
        assert_eq!(deletions, vec![uploads[0].target.clone()]);
    }

    #[tokio::test]
    async fn avatar_requires_profile() {
        let f = fixture().await;
        assert!(matches!(f.service.upload_avatar("alice", PNG).await, Err(ProfileError::ProfileNotFound(_))));
        assert!(f.uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn concurrent_adds_are_not_lost() {
        let f = Arc::new(fixture().await);
        f.service.ensure_profile("alice").await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let f = f.clone();
                tokio::spawn(async move { f.service.add_block("alice", link(&i.to_string(), "https://x.com")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(f.service.list_blocks("alice").await.unwrap().blocks.len(), 20);
    }

    /// Never answers before `delay`
    struct SlowUploader(Duration);

    #[async_trait::async_trait]
    impl ImageAssetUploader for SlowUploader {
        async fn upload(&self, _image: &InlineImage, _target: &AssetTarget) -> Result<url::Url, UploadError> {
            tokio::time::sleep(self.0).await;
            Ok(url::Url::parse("https://assets.bento.test/late.png").unwrap())
        }

        async fn delete(&self, _target: &AssetTarget) -> Result<(), UploadError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_upload_times_out_without_saving() {
        let store = Arc::new(MemoryProfileStore::with_users(&["alice"]).await);
        let settings = AssetSettings {
            upload_timeout: Duration::from_millis(20),
            ..AssetSettings::default()
        };
        let service = ProfileService::new(store.clone(), Arc::new(SlowUploader(Duration::from_secs(5))), settings);

        let before = service.add_block("alice", link("1", "https://x.com")).await.unwrap();

        let err = service.add_block("alice", image("img", PNG)).await.unwrap_err();
        assert!(matches!(err, ProfileError::Upload(UploadError::TimedOut(d)) if d == Duration::from_millis(20)));

        let after = service.list_blocks("alice").await.unwrap();
        assert_eq!(after.version, before.version);
        assert_eq!(after.blocks, before.blocks);
    }
}
