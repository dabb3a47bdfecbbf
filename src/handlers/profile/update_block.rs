// handlers/profile/update_block.rs - PUT /profile/:username/block

use axum::extract::State;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::{BlockPatch, Profile};
use crate::server::AppState;

/// Merge the supplied fields over the block whose id matches `id`.
/// Fields missing from the body keep their stored values.
pub async fn update_block(
    owner: ProfileOwner,
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<BlockPatch>,
) -> ApiResult<Profile> {
    let profile = state.profiles.update_block(&owner.username, patch).await?;
    Ok(ApiResponse::success(profile).with_message("Profile object updated successfully"))
}
