use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{AuthError, AuthGuard, Claims};
use crate::error::ApiError;

/// Proof that the bearer token belongs to the `:username` in the path.
///
/// Declared as the first argument of every gated handler so the check runs
/// before the body is read and before any profile lookup.
#[derive(Clone, Debug)]
pub struct ProfileOwner {
    pub username: String,
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for ProfileOwner
where
    S: Send + Sync,
    Arc<AuthGuard>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid path parameters"))?;
        let username = params
            .get("username")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("Missing username in path"))?;

        let token = extract_bearer_token(&parts.headers)?;
        let guard = Arc::<AuthGuard>::from_ref(state);
        let claims = guard.verify(token, &username)?;

        tracing::debug!("Credential accepted for {}", username);
        Ok(Self { username, claims })
    }
}

/// Token from `Authorization: Bearer <token>`; `None` when the header is absent
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| AuthError::InvalidCredential("Invalid Authorization header format".to_string()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(Some(token.trim())),
        _ => Err(AuthError::InvalidCredential(
            "Authorization header must use Bearer token format".to_string(),
        )),
    }
}
