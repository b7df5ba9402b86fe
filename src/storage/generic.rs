//! Generic Storage For the Smoke-Test Server - Data Abstraction Layer (DAL)

use crate::types::{ExpirationTime, StorageKey, StorageValue};

/// Trait CRUD: Create, Read, Update, Delete, over the value half of storage.
pub trait Crud {
    /// Create (or overwrite) an element, returning the previous value if any.
    fn create(&mut self, key: StorageKey, value: StorageValue) -> Option<StorageValue>;

    /// Read an element.
    fn read(&self, key: &StorageKey) -> Option<StorageValue>;

    /// Update an element, returning the previous value if any.
    fn update(&mut self, key: StorageKey, value: StorageValue) -> Option<StorageValue> {
        self.create(key, value)
    }

    /// Delete an element, returning it if it was present.
    fn delete(&mut self, key: &StorageKey) -> Option<StorageValue>;
}

/// A pluggable storage backend - could be in-memory, a binary tree map, a
/// file, or a DB. The [`crate::server::Server`] and [`crate::expiry`]'s
/// eviction loop are generic over this trait rather than over a concrete
/// type, so a different backend can be dropped in without touching either.
pub trait Storage: Crud + Send + Sync {
    /// Create an empty instance of the storage.
    fn new() -> Self;

    /// Set (or clear) the expiration time of `key`. A no-op for keys that
    /// are not present.
    fn set_expiry(&mut self, key: &StorageKey, at: ExpirationTime);

    /// The expiration time currently recorded for `key`, if any.
    fn expiry_of(&self, key: &StorageKey) -> ExpirationTime;

    /// Every key whose recorded expiration time is at or before `now_ms`.
    fn expired_keys(&self, now_ms: u128) -> Vec<StorageKey>;
}
