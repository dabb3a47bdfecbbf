use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{AssetTarget, ImageAssetUploader, UploadError};
use crate::models::InlineImage;

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    file: String,
    folder: &'a str,
    public_id: &'a str,
    overwrite: bool,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Client for a Cloudinary-style hosted image API: `POST {endpoint}` with
/// `{file, folder, public_id, overwrite}` answers `{secure_url}`, and
/// `DELETE {endpoint}/{folder}/{public_id}` removes an object.
pub struct HttpImageUploader {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpImageUploader {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn rejected(response: reqwest::Response) -> UploadError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        UploadError::Rejected { status, body }
    }
}

#[async_trait]
impl ImageAssetUploader for HttpImageUploader {
    async fn upload(&self, image: &InlineImage, target: &AssetTarget) -> Result<Url, UploadError> {
        target.validated_segments()?;

        let payload = UploadRequest {
            file: image.to_data_uri(),
            folder: &target.folder,
            public_id: &target.object_name,
            overwrite: true,
        };

        let response = self
            .authorize(self.client.post(&self.endpoint))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!("Uploaded {}/{} -> {}", target.folder, target.object_name, uploaded.secure_url);

        let url = Url::parse(&uploaded.secure_url).map_err(|_| UploadError::InvalidUrl(uploaded.secure_url.clone()))?;
        match url.scheme() {
            "https" | "http" => Ok(url),
            _ => Err(UploadError::InvalidUrl(uploaded.secure_url)),
        }
    }

    async fn delete(&self, target: &AssetTarget) -> Result<(), UploadError> {
        target.validated_segments()?;

        let response = self
            .authorize(
                self.client
                    .delete(format!("{}/{}/{}", self.endpoint, target.folder, target.object_name)),
            )
            .send()
            .await?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::rejected(response).await)
        }
    }
}
