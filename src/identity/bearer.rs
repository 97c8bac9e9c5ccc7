use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use super::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// The prefix is matched case-sensitively and the value must split into exactly two
/// whitespace-separated fields, so a token with embedded whitespace is refused.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AuthError::MissingAuthorization);
    };
    let auth = value.to_str().map_err(|_| AuthError::MissingAuthorization)?;
    if auth.is_empty() {
        return Err(AuthError::MissingAuthorization);
    }
    if !auth.starts_with(BEARER_PREFIX) {
        return Err(AuthError::WrongScheme);
    }
    match auth.split_whitespace().collect::<Vec<_>>().as_slice() {
        [_, token] => Ok((*token).to_string()),
        _ => Err(AuthError::MalformedAuthorization),
    }
}
