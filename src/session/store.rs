use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::auth::{decode_credential, Claims};
use crate::error::{DecodeError, StorageError};
use crate::storage::KeyValueStore;

#[derive(Debug, Default)]
struct Mirror {
    credential: Option<String>,
    // Bumped on every set/clear so in-flight work can detect a changed session
    generation: u64,
}

/// Holds the current credential and owns its durable slot.
///
/// Only [`SessionStore::set`] and [`SessionStore::clear`] write the slot. The
/// persisted value is written first and the in-memory mirror follows only on
/// success, so a failed write never leaves the two disagreeing.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mirror: Mutex<Mirror>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            mirror: Mutex::new(Mirror::default()),
        }
    }

    /// Adopt whatever credential survived the last run.
    ///
    /// A credential that fails to decode is removed from storage.
    pub fn rehydrate(&self) -> Option<Claims> {
        let mut mirror = self.mirror.lock();
        mirror.generation += 1;
        mirror.credential = None;

        let stored = match self.storage.get(&self.key) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Session storage unreadable, starting anonymous: {}", e);
                return None;
            }
        };
        let credential = stored?;

        match decode_credential(&credential) {
            Ok(claims) => {
                debug!("Rehydrated session for subject {}", claims.subject_id);
                mirror.credential = Some(credential);
                Some(claims)
            }
            Err(e) => {
                warn!("Discarding stored credential: {}", e);
                if let Err(e) = self.storage.remove(&self.key) {
                    warn!("Failed to remove corrupt credential: {}", e);
                }
                None
            }
        }
    }

    pub fn set(&self, credential: &str) -> Result<(), StorageError> {
        let mut mirror = self.mirror.lock();
        self.storage.set(&self.key, credential)?;
        mirror.credential = Some(credential.to_string());
        mirror.generation += 1;
        Ok(())
    }

    /// Store a credential only if no set/clear happened since `generation` was read
    pub fn set_if_unchanged(&self, credential: &str, generation: u64) -> Result<bool, StorageError> {
        let mut mirror = self.mirror.lock();
        if mirror.generation != generation {
            return Ok(false);
        }
        self.storage.set(&self.key, credential)?;
        mirror.credential = Some(credential.to_string());
        mirror.generation += 1;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        let mut mirror = self.mirror.lock();
        self.storage.remove(&self.key)?;
        mirror.credential = None;
        mirror.generation += 1;
        Ok(())
    }

    pub fn credential(&self) -> Option<String> {
        self.mirror.lock().credential.clone()
    }

    pub fn generation(&self) -> u64 {
        self.mirror.lock().generation
    }

    /// Claims are recomputed from the credential on every call
    pub fn claims(&self) -> Option<Result<Claims, DecodeError>> {
        self.credential().map(|credential| decode_credential(&credential))
    }
}
