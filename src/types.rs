//! # Types
//!
//! Types used throughout the storage layer.
//!
//! The smoke-test server keeps two data structures per stored key:
//! - one mapping keys to values,
//! - the other mapping keys to their expiration time, but only for keys that
//!   actually carry a TTL.
//!
//! This saves space, since most keys never get an expiration set.
//!   - From [EXPIRE](https://redis.io/docs/latest/commands/expire/):
//!     "Normally, Redis keys are created without an associated time to live."

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

/// Primary key. Binary-safe, as RESP3 blob strings are.
pub type StorageKey = Bytes;
/// Stored value. Binary-safe, as RESP3 blob strings are.
pub type StorageValue = Bytes;
/// Milliseconds since the Unix epoch.
pub type ExpirationTimeType = u128;
/// Expiration time of an entry, set only if a TTL was requested for it.
pub type ExpirationTime = Option<ExpirationTimeType>;
/// A concrete in-memory value store - a hash map.
pub type InMemoryStorageHashMap = HashMap<StorageKey, StorageValue>;
/// A concrete in-memory expiry-time store - a hash map.
pub type InMemoryExpiryTimeHashMap = HashMap<StorageKey, ExpirationTime>;
/// Wrapper that makes a storage backend concurrent-safe for the accept loop:
/// every connection task shares one backend instance behind one async lock.
pub type ConcurrentStorageType<S> = Arc<RwLock<S>>;
