//! Eviction Facility
//!
//! A background task that purges expired keys from the storage backend.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, trace};

use crate::constants::HZ_MS;
use crate::storage::Storage;
use crate::types::ConcurrentStorageType;

/// Removes expired keys from the storage.
///
/// Meant to run as a dedicated Tokio task for the lifetime of the server: it
/// sleeps for [`HZ_MS`] milliseconds, then removes every key whose
/// expiration time has passed, looping forever.
pub async fn eviction_loop<S: Storage>(storage: ConcurrentStorageType<S>) {
    debug!("Starting the eviction loop...");
    loop {
        tokio::time::sleep(Duration::from_millis(HZ_MS)).await;

        let now_ms = now_ms();
        let mut guard = storage.write().await;
        let expired = guard.expired_keys(now_ms);
        for key in &expired {
            guard.delete(key);
        }
        if !expired.is_empty() {
            trace!("evicted {} expired key(s)", expired.len());
        }
    }
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis()
}
