//!
//! chirpy storage module
//! ----------------------
//! The persistence collaborator behind the API. Handlers only see the `Store` trait;
//! ids and timestamps are minted by the caller so a store implementation is a plain
//! insert/lookup surface with no clock or id generator of its own.
//!
//! `SharedStore` is the cloneable handle injected into server state. The bundled
//! implementation is `MemoryStore`, an in-process map guarded by a `parking_lot` lock.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A registered account. `hashed_password` is a PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
}

/// A stored chirp; this is also its wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

pub trait Store: Send + Sync {
    fn create_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;
    fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;
    fn create_chirp(&self, chirp: ChirpRecord) -> Result<ChirpRecord, StoreError>;
    fn get_chirp(&self, id: Uuid) -> Result<ChirpRecord, StoreError>;
    /// All chirps, oldest first.
    fn list_chirps(&self) -> Result<Vec<ChirpRecord>, StoreError>;
    /// Drop every user and chirp.
    fn reset(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SharedStore(pub Arc<dyn Store>);

impl SharedStore {
    pub fn new<S: Store + 'static>(store: S) -> Self { Self(Arc::new(store)) }

    pub fn in_memory() -> Self { Self::new(MemoryStore::default()) }
}

impl Deref for SharedStore {
    type Target = dyn Store;
    fn deref(&self) -> &Self::Target { self.0.as_ref() }
}
