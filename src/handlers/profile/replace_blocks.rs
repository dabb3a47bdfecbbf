// handlers/profile/replace_blocks.rs - PUT /profile/:username

use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::{BlockInput, Profile};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceBlocksRequest {
    pub profile_details: Vec<BlockInput>,
}

pub async fn replace_blocks(
    owner: ProfileOwner,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReplaceBlocksRequest>,
) -> ApiResult<Profile> {
    let profile = state
        .profiles
        .replace_all_blocks(&owner.username, body.profile_details)
        .await?;
    Ok(ApiResponse::success(profile).with_message("Profile details updated successfully"))
}
