use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims this service reads from a pre-issued token. Issuance belongs to
/// the account service; only `username` and the standard timestamps matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token not found")]
    MissingCredential,

    #[error("Authorization token expired")]
    Expired,

    #[error("Invalid authorization token: {0}")]
    InvalidCredential(String),

    #[error("Username mismatch")]
    UsernameMismatch { claimed: String, token: String },

    #[error("JWT secret not configured")]
    MissingSecret,
}

/// Verifies that a bearer credential belongs to the username in the path.
/// Pure validation, no lookups and no side effects.
#[derive(Clone)]
pub struct AuthGuard {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard").finish_non_exhaustive()
    }
}

impl AuthGuard {
    pub fn from_secret(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        })
    }

    /// Fails unless `credential` is present, valid, unexpired and its
    /// username claim equals `claimed_username` exactly (case-sensitive).
    pub fn verify(&self, credential: Option<&str>, claimed_username: &str) -> Result<Claims, AuthError> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidCredential(e.to_string()),
            })?
            .claims;

        if claims.username != claimed_username {
            return Err(AuthError::UsernameMismatch {
                claimed: claimed_username.to_string(),
                token: claims.username,
            });
        }

        Ok(claims)
    }
}
