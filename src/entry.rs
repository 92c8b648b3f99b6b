//! Cache entry with its recency stamp.

/// A single cache entry containing the computed result and LRU metadata.
///
/// The stamp is a strictly increasing marker handed out by the store on
/// every access, so the recency order over entries is total and ties never
/// occur. An entry's value is never updated in place; a re-insert for the
/// same key replaces the whole entry.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored result.
    pub(crate) value: V,

    /// Recency marker of the most recent access.
    pub(crate) stamp: u64,
}

impl<V> Entry<V> {
    /// Create a new entry with the given recency stamp.
    pub fn new(value: V, stamp: u64) -> Self {
        Self { value, stamp }
    }

    /// Record an access with a fresh stamp.
    pub fn touch(&mut self, stamp: u64) {
        debug_assert!(stamp > self.stamp);
        self.stamp = stamp;
    }

    /// Get a reference to the value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Get the recency stamp of the last access.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }
}
