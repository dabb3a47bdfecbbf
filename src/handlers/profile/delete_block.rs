// handlers/profile/delete_block.rs - DELETE /profile/:username/block/:object_id

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult, ProfileOwner};
use crate::models::Profile;
use crate::server::AppState;

pub async fn delete_block(
    owner: ProfileOwner,
    Path((_, object_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> ApiResult<Profile> {
    let profile = state.profiles.remove_block(&owner.username, &object_id).await?;
    Ok(ApiResponse::success(profile).with_message("Profile object deleted successfully"))
}
