//! # LRU Response Cache
//!
//! A size-bounded, insertion-LRU cache from key to a small payload record,
//! grounded on the upstream `resp3` package's `lru.go`. Meant for a client
//! that tracks (and caches) the values it has recently read from a server,
//! the way client-side caching ("tracking") works in real Redis clients.
//!
//! Not safe for concurrent access; callers serialize (or wrap it behind a
//! mutex, as [`crate::server::Server`] does for its own storage).
//!
//! Two deliberate deviations from the upstream source, both noted in
//! `DESIGN.md`:
//! - eviction accounting happens in one place ([`Cache::remove_element`])
//!   so `remove` and `remove_oldest` can never drift apart, unlike upstream
//!   where only `RemoveOldest` adjusts `CurrentMemory`;
//! - the cache takes its own epoch at construction time instead of reading
//!   a process-wide global captured at package init.

use std::time::Instant;

use bytes::Bytes;
use indexmap::IndexMap;

/// One cached response: the raw bytes of a value plus enough metadata to
/// reconstruct which cluster slot and key it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    pub slot: u32,
    pub key: Bytes,
    pub value: Bytes,
    /// Milliseconds since the cache's own epoch (see [`Cache::new`]).
    pub timestamp_ms: u64,
}

impl CachedValue {
    /// Accounted size of this entry: key + value bytes, plus a fixed
    /// overhead for the record itself (mirrors upstream's `len(Key) +
    /// len(Value) + 8`).
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len() + 8
    }
}

type OnEvicted = Box<dyn FnMut(Bytes, CachedValue) + Send>;

/// An LRU cache keyed by [`Bytes`], bounded by accounted byte size rather
/// than entry count.
pub struct Cache {
    max_memory: usize,
    current_memory: usize,
    on_evicted: Option<OnEvicted>,
    /// Insertion order doubles as recency order: the most-recently-used
    /// entry is always the last one in the map. Moving an entry to the
    /// front is a `shift_remove` followed by a re-`insert`.
    entries: IndexMap<Bytes, CachedValue>,
    epoch: Instant,
}

impl Cache {
    /// Creates a cache with no eviction callback. `max_memory == 0` disables
    /// eviction entirely; the caller is then responsible for bounding size.
    pub fn new(max_memory: usize) -> Self {
        Cache {
            max_memory,
            current_memory: 0,
            on_evicted: None,
            entries: IndexMap::new(),
            epoch: Instant::now(),
        }
    }

    /// Creates a cache whose `on_evicted` callback fires exactly once per
    /// entry removed, whether by [`Cache::remove`], [`Cache::add`]'s
    /// eviction, or [`Cache::clear`].
    pub fn with_on_evicted(
        max_memory: usize,
        on_evicted: impl FnMut(Bytes, CachedValue) + Send + 'static,
    ) -> Self {
        Cache {
            on_evicted: Some(Box::new(on_evicted)),
            ..Cache::new(max_memory)
        }
    }

    /// Adds (or refreshes) a value in the cache, moving it to the front.
    pub fn add(&mut self, key: Bytes, mut value: CachedValue) {
        if let Some(existing) = self.entries.shift_remove(&key) {
            self.current_memory -= existing.size();
        }
        value.timestamp_ms = self.epoch.elapsed().as_millis() as u64;
        self.current_memory += value.size();
        self.entries.insert(key, value);

        while self.max_memory != 0 && self.current_memory > self.max_memory {
            self.remove_oldest();
        }
    }

    /// Convenience wrapper over [`Cache::add`] for a raw slot/key/value triple.
    pub fn add_value(&mut self, slot: u32, key: Bytes, value: Bytes) {
        let cv = CachedValue {
            slot,
            key: key.clone(),
            value,
            timestamp_ms: 0,
        };
        self.add(key, cv);
    }

    /// Looks up `key`, moving it to the front on a hit.
    pub fn get(&mut self, key: &Bytes) -> Option<&CachedValue> {
        let (k, v) = self.entries.shift_remove_entry(key)?;
        self.entries.insert(k.clone(), v);
        self.entries.get(&k)
    }

    /// Removes `key` from the cache, firing `on_evicted` if it was present.
    pub fn remove(&mut self, key: &Bytes) {
        if let Some((k, v)) = self.entries.shift_remove_entry(key) {
            self.remove_element(k, v);
        }
    }

    /// Removes the least-recently-used entry, firing `on_evicted` if the
    /// cache was non-empty.
    pub fn remove_oldest(&mut self) {
        if let Some((k, v)) = self.entries.shift_remove_index(0) {
            self.remove_element(k, v);
        }
    }

    /// The single place accounted size is decremented and `on_evicted`
    /// fires, so `remove` and `remove_oldest` stay consistent with each
    /// other (see module docs).
    fn remove_element(&mut self, key: Bytes, value: CachedValue) {
        self.current_memory -= value.size();
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(key, value);
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total accounted size of all cached entries.
    pub fn current_memory(&self) -> usize {
        self.current_memory
    }

    /// Purges every entry, firing `on_evicted` once per entry removed.
    pub fn clear(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.current_memory = 0;
        if let Some(cb) = self.on_evicted.as_mut() {
            for (k, v) in entries {
                cb(k, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn value(key: &str, payload: &str) -> (Bytes, CachedValue) {
        let key = Bytes::copy_from_slice(key.as_bytes());
        let cv = CachedValue {
            slot: 0,
            key: key.clone(),
            value: Bytes::copy_from_slice(payload.as_bytes()),
            timestamp_ms: 0,
        };
        (key, cv)
    }

    #[test]
    fn add_then_get_moves_entry_to_front() {
        let mut cache = Cache::new(0);
        let (k1, v1) = value("a", "1");
        let (k2, v2) = value("b", "2");
        cache.add(k1.clone(), v1);
        cache.add(k2.clone(), v2);

        cache.get(&k1);
        cache.remove_oldest();
        assert!(cache.get(&k2).is_none());
        assert!(cache.get(&k1).is_some());
    }

    #[test]
    fn eviction_keeps_population_within_max_memory() {
        let mut cache = Cache::new(0);
        let mut total_size = 0;
        for i in 0..1000 {
            let (k, v) = value(&format!("key-{i}"), "payload");
            total_size += v.size();
            cache.add(k, v);
        }
        let max_memory = total_size / 2;

        let evicted = Arc::new(Mutex::new(Vec::new()));
        let evicted_clone = Arc::clone(&evicted);
        let mut bounded = Cache::with_on_evicted(max_memory, move |k, _| {
            evicted_clone.lock().unwrap().push(k);
        });
        for i in 0..1000 {
            let (k, v) = value(&format!("key-{i}"), "payload");
            bounded.add(k, v);
        }

        assert!(bounded.current_memory() <= max_memory);
        assert!(!evicted.lock().unwrap().is_empty());
        // the most recently inserted suffix must have survived
        assert!(bounded.get(&Bytes::from_static(b"key-999")).is_some());
    }

    #[test]
    fn clear_fires_on_evicted_for_every_remaining_entry_and_zeroes_size() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let evicted_clone = Arc::clone(&evicted);
        let mut cache = Cache::with_on_evicted(0, move |k, _| {
            evicted_clone.lock().unwrap().push(k);
        });
        let (k1, v1) = value("a", "1");
        let (k2, v2) = value("b", "2");
        cache.add(k1.clone(), v1);
        cache.add(k2.clone(), v2);

        cache.clear();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.current_memory(), 0);
        let seen = evicted.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&k1));
        assert!(seen.contains(&k2));
    }

    #[test]
    fn remove_and_remove_oldest_both_decrement_current_memory() {
        let mut cache = Cache::new(0);
        let (k1, v1) = value("a", "1");
        let (k2, v2) = value("b", "22");
        let size1 = v1.size();
        let size2 = v2.size();
        cache.add(k1.clone(), v1);
        cache.add(k2, v2);
        assert_eq!(cache.current_memory(), size1 + size2);

        cache.remove(&k1);
        assert_eq!(cache.current_memory(), size2);

        cache.remove_oldest();
        assert_eq!(cache.current_memory(), 0);
    }
}
