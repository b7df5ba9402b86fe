//! In-memory (not persistent) representation of a CRUD storage backend.

use crate::storage::generic::{Crud, Storage};
use crate::types::{
    ExpirationTime, InMemoryExpiryTimeHashMap, InMemoryStorageHashMap, StorageKey, StorageValue,
};

/// The backend the smoke-test server runs against: one hash map for values,
/// one for the (sparse) expiry times, matching the two-structure layout
/// described in [`crate::types`].
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: InMemoryStorageHashMap,
    expiry: InMemoryExpiryTimeHashMap,
}

impl Crud for InMemoryStorage {
    fn create(&mut self, key: StorageKey, value: StorageValue) -> Option<StorageValue> {
        self.values.insert(key, value)
    }

    fn read(&self, key: &StorageKey) -> Option<StorageValue> {
        self.values.get(key).cloned()
    }

    fn delete(&mut self, key: &StorageKey) -> Option<StorageValue> {
        self.expiry.remove(key);
        self.values.remove(key)
    }
}

impl Storage for InMemoryStorage {
    fn new() -> Self {
        Self::default()
    }

    fn set_expiry(&mut self, key: &StorageKey, at: ExpirationTime) {
        if !self.values.contains_key(key) {
            return;
        }
        match at {
            Some(_) => {
                self.expiry.insert(key.clone(), at);
            }
            None => {
                self.expiry.remove(key);
            }
        }
    }

    fn expiry_of(&self, key: &StorageKey) -> ExpirationTime {
        self.expiry.get(key).copied().flatten()
    }

    fn expired_keys(&self, now_ms: u128) -> Vec<StorageKey> {
        self.expiry
            .iter()
            .filter_map(|(key, at)| match at {
                Some(at) if *at <= now_ms => Some(key.clone()),
                _ => None,
            })
            .collect()
    }
}
