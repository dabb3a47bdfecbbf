// handlers/profile/get_profile.rs - GET /profile/:username (public)

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Profile;
use crate::server::AppState;

pub async fn get_profile(Path(username): Path<String>, State(state): State<AppState>) -> ApiResult<Profile> {
    let profile = state.profiles.list_blocks(&username).await?;
    Ok(ApiResponse::success(profile))
}
