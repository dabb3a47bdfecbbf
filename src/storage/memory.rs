use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use url::Url;

use super::{AssetTarget, ImageAssetUploader, UploadError};
use crate::models::InlineImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub target: AssetTarget,
    pub media_type: String,
    pub size: usize,
}

/// Keeps uploads in memory and hands out `<base>/<folder>/<object>` URLs
pub struct MemoryImageUploader {
    base_url: String,
    uploads: Mutex<Vec<StoredAsset>>,
    deletions: Mutex<Vec<AssetTarget>>,
    failing: AtomicBool,
}

impl MemoryImageUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            uploads: Mutex::new(Vec::new()),
            deletions: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every following call fail with `Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<StoredAsset> {
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn deletions(&self) -> Vec<AssetTarget> {
        self.deletions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check_available(&self) -> Result<(), UploadError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UploadError::Unavailable("memory uploader set to fail".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryImageUploader {
    fn default() -> Self {
        Self::new("https://assets.bento.test")
    }
}

#[async_trait]
impl ImageAssetUploader for MemoryImageUploader {
    async fn upload(&self, image: &InlineImage, target: &AssetTarget) -> Result<Url, UploadError> {
        self.check_available()?;
        target.validated_segments()?;

        let raw = format!("{}/{}/{}", self.base_url, target.folder, target.object_name);
        let url = Url::parse(&raw).map_err(|_| UploadError::InvalidUrl(raw))?;

        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).push(StoredAsset {
            target: target.clone(),
            media_type: image.media_type().to_string(),
            size: image.bytes().len(),
        });
        Ok(url)
    }

    async fn delete(&self, target: &AssetTarget) -> Result<(), UploadError> {
        self.check_available()?;
        self.deletions.lock().unwrap_or_else(|e| e.into_inner()).push(target.clone());
        Ok(())
    }
}
