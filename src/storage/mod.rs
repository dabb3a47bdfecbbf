//! Image externalization: turning an inline payload into a hosted URL.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::InlineImage;

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpImageUploader;
pub use local::LocalImageUploader;
pub use memory::MemoryImageUploader;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid asset target: {0}")]
    InvalidTarget(String),

    #[error("Asset store returned an unusable URL: {0}")]
    InvalidUrl(String),

    #[error("Asset store rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Upload timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Asset store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Where an asset lands: `<namespace>/<username>` plus an object name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTarget {
    pub folder: String,
    pub object_name: String,
}

impl AssetTarget {
    pub fn new(folder: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            object_name: object_name.into(),
        }
    }

    /// Block image: `<ns>/<user>` / `<ns>_<user>_<timestamp>`
    pub fn block_image(namespace: &str, username: &str, timestamp_ms: i64) -> Self {
        Self::new(
            format!("{}/{}", namespace, username),
            format!("{}_{}_{}", namespace, username, timestamp_ms),
        )
    }

    /// Avatar under a fixed name, overwritten on every upload
    pub fn avatar(namespace: &str, username: &str) -> Self {
        Self::new(format!("{}/{}", namespace, username), "avatar")
    }

    /// Avatar under a unique name, for stores where old avatars get deleted
    pub fn versioned_avatar(namespace: &str, username: &str, timestamp_ms: i64) -> Self {
        Self::new(format!("{}/{}", namespace, username), format!("avatar_{}", timestamp_ms))
    }

    /// Folder segments and object name, rejecting anything that could
    /// escape the user's scope
    pub fn validated_segments(&self) -> Result<Vec<&str>, UploadError> {
        let mut segments: Vec<&str> = self.folder.split('/').collect();
        segments.push(&self.object_name);

        for segment in &segments {
            let bad = segment.is_empty()
                || *segment == "."
                || *segment == ".."
                || segment.chars().any(|c| c == '\\' || c == '/' || c.is_control());
            if bad {
                return Err(UploadError::InvalidTarget(format!("{}/{}", self.folder, self.object_name)));
            }
        }
        Ok(segments)
    }
}

/// Externalizes inline images to durable, publicly retrievable URLs
#[async_trait]
pub trait ImageAssetUploader: Send + Sync {
    /// Store `image` at `target`, overwriting any object with the same name
    async fn upload(&self, image: &InlineImage, target: &AssetTarget) -> Result<Url, UploadError>;

    /// Remove a previously uploaded object. Missing objects are not an error.
    async fn delete(&self, target: &AssetTarget) -> Result<(), UploadError>;
}

/// Millisecond timestamps for object names, strictly increasing so two
/// uploads in the same millisecond still get distinct names.
#[derive(Debug, Default)]
pub struct AssetClock {
    last: AtomicI64,
}

impl AssetClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}
