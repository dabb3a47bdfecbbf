// handlers/profile/bio.rs - PATCH /profile/:username/bio

use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::Profile;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct BioRequest {
    #[serde(default)]
    pub bio: Option<String>,
}

pub async fn update_bio(owner: ProfileOwner, State(state): State<AppState>, ApiJson(body): ApiJson<BioRequest>) -> ApiResult<Profile> {
    let profile = state.profiles.update_bio(&owner.username, body.bio).await?;
    Ok(ApiResponse::success(profile).with_message("Profile Bio updated successfully"))
}
