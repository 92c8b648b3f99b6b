//! The main memoization interface.
//!
//! This module provides the primary `Memoized` type that users interact
//! with. It wires a wrapped callable to the LRU store through the key
//! builder and exposes the statistics and clear operations.

use std::fmt;
use std::sync::Arc;

use crate::config::MemoConfig;
use crate::error::CacheResult;
use crate::key::{CallArgs, KeyBuilder, KeyOutcome};
use crate::stats::{CacheInfo, CacheStats};
use crate::store::LruStore;

type MemoFn<V> = dyn Fn(&CallArgs) -> V + Send + Sync;

/// A memoized callable with LRU-bounded result caching.
///
/// # Features
/// - **Thread-safe**: Can be safely shared across threads by cloning
///   (clones share the same cache).
/// - **LRU eviction**: When the configured maxsize is reached, the least
///   recently used result is evicted.
/// - **Typed keys**: Optionally distinguish `f(3)` from `f(3.0)`.
/// - **State partitioning**: Fold external context into every key.
/// - **Statistics**: `cache_info()` reports hits, misses, maxsize, and
///   current size.
///
/// # Example
/// ```
/// use fastmemo::{ArgValue, CallArgs, MemoConfig, Memoized};
///
/// let square = Memoized::new(MemoConfig::new().maxsize(325).build(), |args: &CallArgs| {
///     match args.positional() {
///         [ArgValue::Int(n)] => n * n,
///         _ => 0,
///     }
/// });
///
/// assert_eq!(square.call(&CallArgs::new().arg(12i64)).unwrap(), 144);
/// assert_eq!(square.call(&CallArgs::new().arg(12i64)).unwrap(), 144);
///
/// let info = square.cache_info();
/// assert_eq!((info.hits, info.misses, info.currsize), (1, 1, 1));
/// ```
///
/// # Weak consistency on racing misses
///
/// The wrapped computation runs outside the store's critical section. Two
/// concurrent misses on the same uncached key may therefore both compute
/// the result; the second insert simply replaces the first. This is an
/// at-most-one-is-final guarantee, not at-most-one-executes.
#[derive(Clone)]
pub struct Memoized<V> {
    inner: Arc<Inner<V>>,
}

struct Inner<V> {
    /// The wrapped computation.
    func: Box<MemoFn<V>>,

    /// Key construction, configured once.
    keys: KeyBuilder,

    /// The eviction engine.
    store: LruStore<V>,
}

impl<V: Clone> Memoized<V> {
    /// Wrap a callable with the given configuration.
    ///
    /// # Example
    /// ```
    /// use fastmemo::{CallArgs, MemoConfig, Memoized};
    ///
    /// let constant = Memoized::new(MemoConfig::default(), |_: &CallArgs| 7u64);
    /// assert_eq!(constant.call(&CallArgs::new()).unwrap(), 7);
    /// ```
    pub fn new(config: MemoConfig, func: impl Fn(&CallArgs) -> V + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                func: Box::new(func),
                keys: KeyBuilder::new(config.typed, config.state, config.unhashable),
                store: LruStore::new(config.maxsize),
            }),
        }
    }

    /// Call the wrapped computation through the cache.
    ///
    /// A hit returns the stored result without invoking the computation.
    /// On a miss the computation runs outside the store lock and its result
    /// is inserted, possibly evicting the least recently used entry. An
    /// uncacheable call (opaque argument under the `Warning` or `Ignore`
    /// policy) records a miss and runs uncached; under the `Error` policy
    /// it fails fast without caching anything.
    ///
    /// Only results that are actually produced get inserted: if the
    /// computation panics, nothing is cached.
    pub fn call(&self, args: &CallArgs) -> CacheResult<V> {
        let key = match self.inner.keys.build(args)? {
            KeyOutcome::Key(key) => key,
            KeyOutcome::Uncacheable => {
                self.inner.store.stats().record_miss();
                return Ok((self.inner.func)(args));
            }
        };

        if let Some(value) = self.inner.store.lookup(&key) {
            return Ok(value);
        }

        // Miss: compute outside the store's critical section. A racing
        // caller may insert the same key first; our insert replaces it.
        let value = (self.inner.func)(args);
        self.inner.store.insert(key, value.clone());
        Ok(value)
    }

    /// Get a snapshot of the cache statistics.
    ///
    /// # Example
    /// ```
    /// use fastmemo::{CallArgs, MemoConfig, Memoized};
    ///
    /// let id = Memoized::new(MemoConfig::default(), |_: &CallArgs| 0i32);
    /// let _ = id.call(&CallArgs::new().arg(1i64)); // miss
    /// let _ = id.call(&CallArgs::new().arg(1i64)); // hit
    /// println!("{}", id.cache_info()); // CacheInfo(hits=1, misses=1, maxsize=128, currsize=1)
    /// ```
    pub fn cache_info(&self) -> CacheInfo {
        self.inner
            .store
            .stats()
            .snapshot(self.inner.store.maxsize())
    }

    /// Clear the cache and reset the statistics together.
    ///
    /// Idempotent: clearing an already empty cache leaves size 0 and all
    /// counters at zero.
    pub fn cache_clear(&self) {
        self.inner.store.clear();
        self.inner.store.stats().reset();
    }

    /// Invoke the underlying computation directly, bypassing the cache.
    ///
    /// Nothing is looked up, inserted, or counted.
    pub fn wrapped(&self, args: &CallArgs) -> V {
        (self.inner.func)(args)
    }

    /// Get a reference to the internal statistics counters.
    ///
    /// This is useful for integrating with external metrics systems; it
    /// also exposes the eviction count, which `cache_info` does not carry.
    pub fn stats_ref(&self) -> Arc<CacheStats> {
        self.inner.store.stats()
    }
}

impl<V> fmt::Debug for Memoized<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("maxsize", &self.inner.store.maxsize())
            .field("typed", &self.inner.keys.is_typed())
            .finish_non_exhaustive()
    }
}
