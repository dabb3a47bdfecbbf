// handlers/profile/avatar.rs - POST /profile/:username/avatar

use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::Profile;
use crate::server::AppState;

/// `avatar` is always an inline `data:image/...;base64,` payload
#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: String,
}

pub async fn upload_avatar(
    owner: ProfileOwner,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AvatarRequest>,
) -> ApiResult<Profile> {
    let profile = state.profiles.upload_avatar(&owner.username, &body.avatar).await?;
    Ok(ApiResponse::success(profile).with_message("Avatar uploaded successfully"))
}
