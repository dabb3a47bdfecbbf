use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::{AssetTarget, ImageAssetUploader, UploadError};
use crate::models::InlineImage;

/// Writes assets under a local directory that the server exposes
/// at `public_base_url` (see `/assets` in the router).
pub struct LocalImageUploader {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageUploader {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, target: &AssetTarget) -> Result<PathBuf, UploadError> {
        let segments = target.validated_segments()?;
        let (_, folder) = segments.split_last().ok_or_else(|| UploadError::InvalidTarget(target.folder.clone()))?;
        Ok(folder.iter().fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    /// Remove every file named `<object_name>.<any extension>` in the folder
    async fn remove_existing(folder: &Path, object_name: &str) -> Result<usize, UploadError> {
        let mut entries = match tokio::fs::read_dir(folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(object_name) {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl ImageAssetUploader for LocalImageUploader {
    async fn upload(&self, image: &InlineImage, target: &AssetTarget) -> Result<Url, UploadError> {
        let folder = self.folder_path(target)?;
        tokio::fs::create_dir_all(&folder).await?;

        // Same object name with another extension would otherwise linger
        Self::remove_existing(&folder, &target.object_name).await?;

        let file_name = format!("{}.{}", target.object_name, image.extension());
        tokio::fs::write(folder.join(&file_name), image.bytes()).await?;
        debug!("Stored {} bytes at {}/{}", image.bytes().len(), target.folder, file_name);

        let raw = format!("{}/{}/{}", self.public_base_url, target.folder, file_name);
        Url::parse(&raw).map_err(|_| UploadError::InvalidUrl(raw))
    }

    async fn delete(&self, target: &AssetTarget) -> Result<(), UploadError> {
        let folder = self.folder_path(target)?;
        Self::remove_existing(&folder, &target.object_name).await?;
        Ok(())
    }
}
