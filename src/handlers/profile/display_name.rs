// handlers/profile/display_name.rs - PATCH /profile/:username/displayname

use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::Profile;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DisplayNameRequest {
    #[serde(default)]
    pub displayname: Option<String>,
}

pub async fn update_display_name(
    owner: ProfileOwner,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DisplayNameRequest>,
) -> ApiResult<Profile> {
    let profile = state
        .profiles
        .update_display_name(&owner.username, body.displayname)
        .await?;
    Ok(ApiResponse::success(profile).with_message("Profile Name updated successfully"))
}
