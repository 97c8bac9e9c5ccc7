//! Chirp creation and lookup.
//!
//! Creation is a straight line: authorize, decode, length check, redact, persist.
//! The store call is the only commit point, so a request that fails earlier leaves
//! nothing behind.

mod moderation;

pub use moderation::{check_length, clean_body, MAX_CHIRP_LENGTH, PROFANE_WORDS, REDACTED};

use axum::http::HeaderMap;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::{authorize, AuthError};
use crate::storage::{ChirpRecord, Store, StoreError};

#[derive(Debug, Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

/// Run the moderated write path for one request. `body` is the raw request payload;
/// it is decoded only after the caller is authorized.
pub fn create_chirp(store: &dyn Store, headers: &HeaderMap, secret: &[u8], body: &[u8]) -> AppResult<ChirpRecord> {
    let user_id = authorize(headers, secret)?;
    let req: ChirpRequest = serde_json::from_slice(body)
        .map_err(|_| AppError::user("malformed_request", "Malformed Request"))?;
    check_length(&req.body)?;
    let now = Utc::now();
    let chirp = ChirpRecord {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        body: clean_body(&req.body),
        user_id,
    };
    let saved = store.create_chirp(chirp).map_err(|e| match e {
        // a signed token for an account that no longer exists
        StoreError::NotFound(_) => AppError::from(AuthError::UnknownSubject(user_id)),
        other => AppError::from(other),
    })?;
    info!(target: "chirpy::chirps", chirp_id = %saved.id, user_id = %saved.user_id, "chirp created");
    Ok(saved)
}

pub fn list_chirps(store: &dyn Store) -> AppResult<Vec<ChirpRecord>> {
    Ok(store.list_chirps()?)
}

/// Look up one chirp by the textual id taken from the path.
pub fn get_chirp(store: &dyn Store, raw_id: &str) -> AppResult<ChirpRecord> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::user("malformed_id", "Malformed Chirp UUID"))?;
    store.get_chirp(id).map_err(|e| match e {
        StoreError::NotFound(_) => AppError::not_found("not_found".to_string(), format!("No Chirp by [{raw_id}] id found")),
        other => AppError::from(other),
    })
}
