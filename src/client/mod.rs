//! HTTP client for the profile API that keeps a [`MirrorState`] in step with
//! every successful response.

use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::mirror::{MirrorAction, MirrorState, Transition};
use crate::models::{BlockInput, BlockPatch, Profile};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No bearer token configured")]
    MissingToken,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceBlocksBody<'a> {
    profile_details: &'a [BlockInput],
}

pub struct ProfileClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    token: Option<String>,
    mirror: MirrorState,
}

impl ProfileClient {
    pub fn new(base_url: &str, username: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            username: username.into(),
            token,
            mirror: MirrorState::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn mirror(&self) -> &MirrorState {
        &self.mirror
    }

    /// Apply a local-only transition, e.g. seeding suggestion blocks during onboarding
    pub fn stage(&mut self, action: MirrorAction) -> Transition {
        self.mirror.apply(action)
    }

    /// GET /profile/:username (no token needed); the mirror adopts the result
    pub async fn fetch(&mut self) -> Result<Profile, ClientError> {
        let url = self.url(&[])?;
        let profile: Profile = self.send(self.http.get(url)).await?;
        self.mirror.reconcile(&profile);
        Ok(profile)
    }

    pub async fn add_block(&mut self, input: BlockInput) -> Result<Profile, ClientError> {
        let id = input.id.clone();
        let request = self.authorized(Method::POST, &["block"])?.json(&input);
        let profile: Profile = self.send(request).await?;

        if let Some(block) = profile.blocks.last_with_id(&id) {
            self.mirror.apply(MirrorAction::UpsertBlock(block.clone()));
        }
        Ok(profile)
    }

    pub async fn update_block(&mut self, patch: BlockPatch) -> Result<Profile, ClientError> {
        let request = self.authorized(Method::PUT, &["block"])?.json(&patch);
        let profile: Profile = self.send(request).await?;

        if let Some(block) = profile.blocks.get(&patch.id) {
            self.mirror.apply(MirrorAction::UpdateBlock(block.clone()));
        }
        Ok(profile)
    }

    pub async fn replace_all(&mut self, blocks: Vec<BlockInput>) -> Result<Profile, ClientError> {
        let body = ReplaceBlocksBody { profile_details: &blocks };
        let request = self.authorized(Method::PUT, &[])?.json(&body);
        let profile: Profile = self.send(request).await?;

        self.mirror
            .apply(MirrorAction::SetAllBlocks(profile.blocks.clone().into_vec()));
        Ok(profile)
    }

    pub async fn remove_block(&mut self, block_id: &str) -> Result<Profile, ClientError> {
        let request = self.authorized(Method::DELETE, &["block", block_id])?;
        let profile: Profile = self.send(request).await?;

        self.mirror.apply(MirrorAction::RemoveBlock(block_id.to_string()));
        Ok(profile)
    }

    pub async fn set_display_name(&mut self, value: Option<String>) -> Result<Profile, ClientError> {
        let request = self
            .authorized(Method::PATCH, &["displayname"])?
            .json(&json!({ "displayname": value }));
        self.send(request).await
    }

    pub async fn set_bio(&mut self, value: Option<String>) -> Result<Profile, ClientError> {
        let request = self.authorized(Method::PATCH, &["bio"])?.json(&json!({ "bio": value }));
        self.send(request).await
    }

    /// `data_uri` must be a `data:image/...;base64,` payload
    pub async fn upload_avatar(&mut self, data_uri: &str) -> Result<Profile, ClientError> {
        let request = self
            .authorized(Method::POST, &["avatar"])?
            .json(&json!({ "avatar": data_uri }));
        self.send(request).await
    }

    /// End of onboarding: drop untouched suggestions, push the remaining
    /// blocks as the whole collection, then leave first-time mode.
    pub async fn finish_onboarding(&mut self) -> Result<Profile, ClientError> {
        self.mirror.apply(MirrorAction::FilterSuggestions);
        let blocks: Vec<BlockInput> = self.mirror.blocks.iter().cloned().map(BlockInput::from).collect();

        let profile = self.replace_all(blocks).await?;
        self.mirror.apply(MirrorAction::SetFirstTime(false));
        Ok(profile)
    }

    /// `<base>/profile/<username>/<segments...>`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("profile")
            .push(&self.username)
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        let url = self.url(segments)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}
