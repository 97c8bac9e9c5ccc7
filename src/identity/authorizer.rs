use axum::http::HeaderMap;
use uuid::Uuid;

use super::{get_bearer_token, validate_jwt, AuthError};

/// Resolve the calling user from request headers: bearer extraction, then token
/// validation. The first failure is returned untouched.
pub fn authorize(headers: &HeaderMap, secret: &[u8]) -> Result<Uuid, AuthError> {
    let token = get_bearer_token(headers)?;
    validate_jwt(&token, secret)
}
