//! The LRU store: the eviction engine behind the memoization cache.
//!
//! This module provides the low-level store using an `IndexMap` whose index
//! order is the recency order: the front entry is the least recently used,
//! the back entry the most recently used. A hit moves the entry to the back;
//! inserting a new key over a bounded capacity evicts the front entry.

use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::Maxsize;
use crate::entry::Entry;
use crate::key::CacheKey;
use crate::stats::CacheStats;

/// Thread-safe LRU store mapping cache keys to computed results.
///
/// All mutating operations (lookup-with-promotion, insert, clear) serialize
/// on the write lock; promotion counts as a mutation, so no caller ever
/// observes a partially updated recency order. The store itself never fails
/// on a valid key: a lookup on an absent key is a normal miss.
///
/// Recency is totally ordered: every access assigns a strictly increasing
/// stamp, so ties between entries never occur.
#[derive(Debug)]
pub struct LruStore<V> {
    /// Keyed entries in recency order (front = least recently used).
    entries: RwLock<IndexMap<CacheKey, Entry<V>>>,

    /// Capacity bound fixed at construction.
    maxsize: Maxsize,

    /// Statistics for cache operations.
    stats: Arc<CacheStats>,

    /// Source of strictly increasing recency stamps.
    tick: AtomicU64,
}

impl<V> LruStore<V> {
    /// The capacity bound fixed at construction.
    pub fn maxsize(&self) -> Maxsize {
        self.maxsize
    }
}

impl<V: Clone> LruStore<V> {
    /// Create a store with the given capacity bound.
    ///
    /// `Maxsize::Bounded(0)` is the degenerate always-miss configuration:
    /// nothing is ever retained.
    pub fn new(maxsize: Maxsize) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            maxsize,
            stats: Arc::new(CacheStats::new()),
            tick: AtomicU64::new(0),
        }
    }

    /// Look up a key, promoting it to most recently used on a hit.
    ///
    /// Returns a clone of the stored result, recording a hit. On absence,
    /// records a miss and leaves the recency order untouched.
    pub fn lookup(&self, key: &CacheKey) -> Option<V> {
        let mut entries = match self.write_lock() {
            Some(entries) => entries,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        let Some(idx) = entries.get_index_of(key) else {
            self.stats.record_miss();
            return None;
        };

        let stamp = self.next_stamp();
        let last = entries.len() - 1;
        entries.move_index(idx, last);
        let value = match entries.get_index_mut(last) {
            Some((_, entry)) => {
                entry.touch(stamp);
                entry.value().clone()
            }
            // Unreachable: the map holds at least the entry just moved.
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        self.stats.record_hit();
        Some(value)
    }

    /// Insert a result, making it the most recently used entry.
    ///
    /// If the key is already resident its entry is replaced and promoted;
    /// replacement never evicts another entry and does not count toward
    /// eviction accounting. If a new key overflows a bounded capacity,
    /// exactly the least recently used entry is evicted, so the store never
    /// exceeds its capacity at rest.
    pub fn insert(&self, key: CacheKey, value: V) {
        if self.maxsize == Maxsize::Bounded(0) {
            return;
        }

        let mut entries = match self.write_lock() {
            Some(entries) => entries,
            None => return,
        };
        let stamp = self.next_stamp();

        if let Some(idx) = entries.get_index_of(&key) {
            entries[idx] = Entry::new(value, stamp);
            let last = entries.len() - 1;
            entries.move_index(idx, last);
            return;
        }

        if let Maxsize::Bounded(max) = self.maxsize {
            while entries.len() >= max {
                self.evict_one(&mut entries);
            }
        }

        entries.insert(key, Entry::new(value, stamp));
        self.stats.increment_size();
    }

    /// Check whether a key is resident, without promoting it.
    pub fn contains(&self, key: &CacheKey) -> bool {
        match self.read_lock() {
            Some(entries) => entries.contains_key(key),
            None => false,
        }
    }

    /// Get the number of resident entries.
    pub fn len(&self) -> usize {
        match self.read_lock() {
            Some(entries) => entries.len(),
            None => 0,
        }
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries and reset the recency order.
    ///
    /// Hit and miss counters are untouched; resetting them together with
    /// the entries is the owning cache's `cache_clear`, which makes the
    /// state transition explicit.
    pub fn clear(&self) {
        if let Some(mut entries) = self.write_lock() {
            entries.clear();
            self.stats.set_size(0);
            tracing::debug!("cache cleared");
        }
    }

    /// Get a reference to the statistics.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    // Private helper methods

    /// Hand out the next recency stamp.
    fn next_stamp(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Acquire a read lock, returning None if poisoned.
    fn read_lock(&self) -> Option<RwLockReadGuard<'_, IndexMap<CacheKey, Entry<V>>>> {
        self.entries.read().ok()
    }

    /// Acquire a write lock, returning None if poisoned.
    fn write_lock(&self) -> Option<RwLockWriteGuard<'_, IndexMap<CacheKey, Entry<V>>>> {
        self.entries.write().ok()
    }

    /// Evict the least recently used entry (the front of the map).
    fn evict_one(&self, entries: &mut IndexMap<CacheKey, Entry<V>>) {
        if let Some((key, _)) = entries.shift_remove_index(0) {
            self.stats.record_eviction();
            self.stats.decrement_size();
            tracing::trace!(?key, "evicted least recently used entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnhashablePolicy;
    use crate::key::{CallArgs, KeyBuilder, KeyOutcome};

    fn key(n: i64) -> CacheKey {
        let builder = KeyBuilder::new(false, Vec::new(), UnhashablePolicy::Error);
        match builder.build(&CallArgs::new().arg(n)).unwrap() {
            KeyOutcome::Key(key) => key,
            KeyOutcome::Uncacheable => unreachable!(),
        }
    }

    #[test]
    fn test_basic_insert_lookup() {
        let store = LruStore::new(Maxsize::Bounded(10));

        store.insert(key(1), "one");
        assert_eq!(store.lookup(&key(1)), Some("one"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_missing_is_a_miss() {
        let store: LruStore<&str> = LruStore::new(Maxsize::Bounded(10));

        assert_eq!(store.lookup(&key(1)), None);
        assert_eq!(store.stats().misses(), 1);
        assert_eq!(store.stats().hits(), 0);
    }

    #[test]
    fn test_replace_keeps_size() {
        let store = LruStore::new(Maxsize::Bounded(10));

        store.insert(key(1), "one");
        store.insert(key(1), "uno");

        assert_eq!(store.lookup(&key(1)), Some("uno"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_eviction() {
        let store = LruStore::new(Maxsize::Bounded(3));

        store.insert(key(1), 1);
        store.insert(key(2), 2);
        store.insert(key(3), 3);
        assert_eq!(store.len(), 3);

        // This should evict key 1 (oldest)
        store.insert(key(4), 4);
        assert_eq!(store.len(), 3);
        assert!(!store.contains(&key(1)));
        assert!(store.contains(&key(4)));
        assert_eq!(store.stats().evictions(), 1);
    }

    #[test]
    fn test_lru_eviction_order() {
        let store = LruStore::new(Maxsize::Bounded(3));

        store.insert(key(1), 1);
        store.insert(key(2), 2);
        store.insert(key(3), 3);

        // Access key 1, making it recently used
        let _ = store.lookup(&key(1));

        // Now key 2 is the LRU
        store.insert(key(4), 4);

        assert!(store.contains(&key(1)));
        assert!(!store.contains(&key(2)));
        assert!(store.contains(&key(3)));
        assert!(store.contains(&key(4)));
    }

    #[test]
    fn test_replacement_at_capacity_never_evicts() {
        let store = LruStore::new(Maxsize::Bounded(3));

        store.insert(key(1), 1);
        store.insert(key(2), 2);
        store.insert(key(3), 3);

        // Replacing a resident key while full must not evict anything.
        store.insert(key(1), 10);

        assert_eq!(store.len(), 3);
        assert!(store.contains(&key(2)));
        assert!(store.contains(&key(3)));
        assert_eq!(store.stats().evictions(), 0);

        // The replaced key was promoted, so key 2 is now the LRU.
        store.insert(key(4), 4);
        assert!(!store.contains(&key(2)));
        assert!(store.contains(&key(1)));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let store = LruStore::new(Maxsize::Bounded(2));

        store.insert(key(1), 1);
        store.insert(key(2), 2);

        // contains must not refresh recency
        assert!(store.contains(&key(1)));

        store.insert(key(3), 3);
        assert!(!store.contains(&key(1)));
        assert!(store.contains(&key(2)));
    }

    #[test]
    fn test_clear_leaves_counters() {
        let store = LruStore::new(Maxsize::Bounded(10));

        store.insert(key(1), 1);
        let _ = store.lookup(&key(1));
        let _ = store.lookup(&key(2));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats().size(), 0);
        // hit/miss counters are the facade's to reset
        assert_eq!(store.stats().hits(), 1);
        assert_eq!(store.stats().misses(), 1);
    }

    #[test]
    fn test_capacity_zero_retains_nothing() {
        let store = LruStore::new(Maxsize::Bounded(0));

        store.insert(key(1), 1);
        assert_eq!(store.len(), 0);
        assert_eq!(store.lookup(&key(1)), None);
        assert_eq!(store.stats().evictions(), 0);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let store = LruStore::new(Maxsize::Unbounded);

        for n in 0..1000 {
            store.insert(key(n), n);
        }
        assert_eq!(store.len(), 1000);
        assert_eq!(store.stats().evictions(), 0);
        assert_eq!(store.lookup(&key(0)), Some(0));
    }

    #[test]
    fn test_stats_tracking() {
        let store = LruStore::new(Maxsize::Bounded(10));

        store.insert(key(1), 1);
        let _ = store.lookup(&key(1)); // Hit
        let _ = store.lookup(&key(9)); // Miss

        let stats = store.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.size(), 1);
    }
}
