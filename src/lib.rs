//! # fastmemo
//!
//! A fast, thread-safe memoization cache for Rust with LRU eviction and
//! typed argument keys.
//!
//! ## Features
//!
//! - **Thread-safe**: Share across threads with `Clone` (uses `Arc` internally)
//! - **LRU eviction**: Automatic eviction of least-recently-used results when
//!   the configured maxsize is reached; unbounded mode disables eviction
//! - **Normalized keys**: Keyword-argument order never matters; `typed` mode
//!   distinguishes `f(3)` from `f(3.0)`
//! - **State partitioning**: Fold external context values into every key to
//!   invalidate across global state changes
//! - **Unhashable policies**: Fail fast, warn, or silently skip caching for
//!   arguments with no hashable representation
//! - **Statistics**: `CacheInfo(hits, misses, maxsize, currsize)` snapshots
//! - **Zero unsafe code**: Built entirely with safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use fastmemo::{ArgValue, CallArgs, MemoConfig, Memoized};
//!
//! // Memoize an expensive computation with at most 325 remembered results.
//! let config = MemoConfig::new().maxsize(325).build();
//! let expensive = Memoized::new(config, |args: &CallArgs| {
//!     match args.positional() {
//!         [ArgValue::Int(n)] => (0..=*n).sum::<i64>(),
//!         _ => 0,
//!     }
//! });
//!
//! // First call computes the result
//! let a = expensive.call(&CallArgs::new().arg(300i64)).unwrap();
//! // Second call returns the cached result instantly
//! let b = expensive.call(&CallArgs::new().arg(300i64)).unwrap();
//! assert_eq!(a, b);
//!
//! let info = expensive.cache_info();
//! assert_eq!((info.hits, info.misses, info.currsize), (1, 1, 1));
//!
//! // Clear the cache and statistics together
//! expensive.cache_clear();
//! assert_eq!(expensive.cache_info().currsize, 0);
//! ```
//!
//! ## Thread Safety
//!
//! A `Memoized` is safe to share across threads. Cloning creates a new
//! handle to the same underlying cache:
//!
//! ```rust
//! use fastmemo::{CallArgs, MemoConfig, Memoized};
//! use std::thread;
//!
//! let memo = Memoized::new(MemoConfig::default(), |args: &CallArgs| {
//!     args.positional().len()
//! });
//!
//! let handles: Vec<_> = (0..4).map(|_| {
//!     let memo = memo.clone();
//!     thread::spawn(move || {
//!         memo.call(&CallArgs::new().arg(1i64)).unwrap()
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 1);
//! }
//! ```
//!
//! The miss-path computation runs outside the store's lock: two concurrent
//! misses on the same uncached key may both compute, and the later insert
//! replaces the earlier one. See [`Memoized::call`].

// Public API - stable in v1.0.0
pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod stats;
pub mod store;

pub use cache::Memoized;
pub use config::{Maxsize, MemoConfig, UnhashablePolicy};
pub use error::{CacheError, CacheResult};
pub use key::{ArgValue, CacheKey, CallArgs, KeyBuilder, KeyOutcome};
pub use stats::{CacheInfo, CacheStats};
pub use store::LruStore;

// Internal modules - not part of public API
pub(crate) mod entry;
