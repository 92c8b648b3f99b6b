//! Error types for the memoization cache library.
//!
//! This module defines the error type covering the two failure modes of the
//! engine, avoiding panics in favor of explicit error handling. A lookup on
//! a missing key is normal control flow, not an error.

use std::fmt;

/// The main error type for cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An argument could not participate in key construction.
    ///
    /// Raised by the key builder when it encounters an opaque value and the
    /// configured policy is [`UnhashablePolicy::Error`]. The string is the
    /// label of the offending value.
    ///
    /// [`UnhashablePolicy::Error`]: crate::config::UnhashablePolicy::Error
    UnhashableArgument(String),

    /// A negative maxsize was supplied at construction time.
    ///
    /// The typed configuration surface (`Maxsize`) cannot express an invalid
    /// capacity; this arises only when bridging from untyped integers via
    /// `Maxsize::try_from`.
    CapacityMisconfigured(i64),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::UnhashableArgument(label) => {
                write!(f, "unhashable argument: '{}'", label)
            }
            CacheError::CapacityMisconfigured(n) => {
                write!(f, "maxsize must be non-negative or unbounded, got {}", n)
            }
        }
    }
}

impl std::error::Error for CacheError {}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
