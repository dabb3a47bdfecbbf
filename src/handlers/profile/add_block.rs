// handlers/profile/add_block.rs - POST /profile/:username/block

use axum::extract::State;

use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProfileOwner};
use crate::models::{BlockInput, Profile};
use crate::server::AppState;

/// Append a block to the owner's profile, creating the profile on first use.
/// Inline images in `imgUrl` are externalized before the block is stored.
///
/// Responds 201 with the full aggregate.
pub async fn add_block(
    owner: ProfileOwner,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BlockInput>,
) -> ApiResult<Profile> {
    let profile = state.profiles.add_block(&owner.username, input).await?;
    Ok(ApiResponse::created(profile).with_message("Profile object added successfully"))
}
