pub mod auth;
pub mod json;
pub mod response;

pub use auth::ProfileOwner;
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
