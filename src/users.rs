//! Account signup and password login.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::{check_password_hash, hash_password, make_jwt, AuthError};
use crate::storage::{SharedStore, StoreError, UserRecord};

/// Longest token lifetime a login may request, and the default when none is given.
pub const MAX_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

/// Public view of an account. `token` is only present on a login response.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(flatten)]
    pub record: UserRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Clamp a requested lifetime: absent, zero or negative means the default, and
/// nothing longer than the cap is ever issued.
pub fn token_lifetime(requested: Option<i64>) -> Duration {
    match requested {
        Some(secs) if secs > 0 && secs <= MAX_TOKEN_TTL_SECS => Duration::seconds(secs),
        _ => Duration::seconds(MAX_TOKEN_TTL_SECS),
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a [u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|_| AppError::user("malformed_request", "Malformed Request"))
}

// argon2 is deliberately slow; keep it off the async workers.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res.map_err(AppError::from),
        Err(e) => {
            error!(target: "chirpy::auth", "credential task failed: {e}");
            Err(AppError::internal("internal", "Something went wrong"))
        }
    }
}

pub async fn signup(store: &SharedStore, body: &[u8]) -> AppResult<User> {
    let req: SignupRequest = decode(body)?;
    let password = req.password;
    let hashed_password = blocking(move || hash_password(&password)).await?;
    let now = Utc::now();
    let record = store.create_user(UserRecord {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        email: req.email,
        hashed_password,
    })?;
    info!(target: "chirpy::users", user_id = %record.id, "user created");
    Ok(User { record, token: None })
}

pub async fn login(store: &SharedStore, secret: &[u8], body: &[u8]) -> AppResult<User> {
    let req: LoginRequest = decode(body)?;
    let record = store.get_user_by_email(&req.email).map_err(|e| match e {
        StoreError::NotFound(_) => AppError::not_found("not_found", "User not found by Email"),
        other => AppError::from(other),
    })?;
    let password = req.password;
    let stored = record.hashed_password.clone();
    blocking(move || check_password_hash(&password, &stored)).await?;
    let token = make_jwt(record.id, secret, token_lifetime(req.expires_in_seconds))?;
    info!(target: "chirpy::users", user_id = %record.id, "login");
    Ok(User { record, token: Some(token) })
}
