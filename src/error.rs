// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::services::ProfileError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret => {
                tracing::error!("Credential check attempted without a JWT secret");
                ApiError::internal_server_error("Server error")
            }
            AuthError::UsernameMismatch { claimed, token } => {
                tracing::warn!("Token for '{}' used against profile '{}'", token, claimed);
                ApiError::unauthorized("Username mismatch")
            }
            other => {
                tracing::warn!("Rejected credential: {}", other);
                ApiError::unauthorized(other.to_string())
            }
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::UserNotFound(_) => ApiError::not_found("User not found"),
            ProfileError::ProfileNotFound(_) => ApiError::not_found("Profile not found for the user"),
            ProfileError::BlockNotFound(_) => ApiError::not_found("Object not found in the profile"),
            ProfileError::InvalidImage(e) => ApiError::bad_request(e.to_string()),
            ProfileError::Conflict(username) => {
                tracing::warn!("Concurrent write rejected for profile '{}'", username);
                ApiError::conflict("Profile was modified by another request, reload and retry")
            }
            // Don't expose storage or upload details to clients
            ProfileError::Upload(e) => {
                tracing::error!("Image upload error: {}", e);
                ApiError::internal_server_error("Server error")
            }
            ProfileError::Store(e) => {
                tracing::error!("Profile store error: {}", e);
                ApiError::internal_server_error("Server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UploadError;

    #[test]
    fn not_found_messages_match_the_api_contract() {
        let cases = [
            (ProfileError::UserNotFound("a".into()), "User not found"),
            (ProfileError::ProfileNotFound("a".into()), "Profile not found for the user"),
            (ProfileError::BlockNotFound("2".into()), "Object not found in the profile"),
        ];
        for (err, message) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(api.message(), message);
        }
    }

    #[test]
    fn internal_failures_do_not_leak_detail() {
        let api: ApiError = ProfileError::Upload(UploadError::Unavailable("bucket-7 quota".into())).into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_json()["message"], "Server error");
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        let api: ApiError = AuthError::UsernameMismatch { claimed: "alice".into(), token: "bob".into() }.into();
        assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(api.to_json()["code"], "UNAUTHORIZED");
    }
}
