use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{ChirpRecord, Store, StoreError, UserRecord};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    /// email -> user id; emails are unique.
    emails: HashMap<String, Uuid>,
    /// Insertion order doubles as creation order.
    chirps: Vec<ChirpRecord>,
    chirp_index: HashMap<Uuid, usize>,
}

/// Process-local store. Every operation takes the lock once, so each insert is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl Store for MemoryStore {
    fn create_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut t = self.tables.write();
        if t.emails.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        t.emails.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        debug!(target: "chirpy::storage", user_id = %user.id, "create_user");
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        let t = self.tables.read();
        t.emails
            .get(email)
            .and_then(|id| t.users.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".into()))
    }

    fn create_chirp(&self, chirp: ChirpRecord) -> Result<ChirpRecord, StoreError> {
        let mut t = self.tables.write();
        if !t.users.contains_key(&chirp.user_id) {
            return Err(StoreError::NotFound("user".into()));
        }
        let idx = t.chirps.len();
        t.chirp_index.insert(chirp.id, idx);
        t.chirps.push(chirp.clone());
        debug!(target: "chirpy::storage", chirp_id = %chirp.id, user_id = %chirp.user_id, "create_chirp");
        Ok(chirp)
    }

    fn get_chirp(&self, id: Uuid) -> Result<ChirpRecord, StoreError> {
        let t = self.tables.read();
        t.chirp_index
            .get(&id)
            .and_then(|&idx| t.chirps.get(idx))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("chirp".into()))
    }

    fn list_chirps(&self) -> Result<Vec<ChirpRecord>, StoreError> {
        Ok(self.tables.read().chirps.clone())
    }

    fn reset(&self) -> Result<(), StoreError> {
        *self.tables.write() = Tables::default();
        debug!(target: "chirpy::storage", "reset");
        Ok(())
    }
}
