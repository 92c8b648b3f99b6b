//! Configuration for the memoization cache.
//!
//! This module provides a builder pattern for configuring cache behavior:
//! the capacity bound, typed keys, the state sequence, and the policy for
//! unhashable arguments.

use std::fmt;

use crate::error::CacheError;
use crate::key::ArgValue;

/// The capacity bound of a cache.
///
/// `Bounded(0)` is a valid degenerate configuration: nothing is ever
/// retained and every call is a miss. `Unbounded` disables eviction
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maxsize {
    /// At most this many entries are resident; the least recently used
    /// entry is evicted on overflow.
    Bounded(usize),

    /// No eviction ever occurs; size grows without limit.
    Unbounded,
}

impl Maxsize {
    /// The entry limit, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Maxsize::Bounded(n) => Some(*n),
            Maxsize::Unbounded => None,
        }
    }

    /// Whether eviction is disabled.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Maxsize::Unbounded)
    }
}

impl Default for Maxsize {
    fn default() -> Self {
        Maxsize::Bounded(128)
    }
}

impl From<usize> for Maxsize {
    fn from(n: usize) -> Self {
        Maxsize::Bounded(n)
    }
}

impl From<Option<usize>> for Maxsize {
    fn from(n: Option<usize>) -> Self {
        match n {
            Some(n) => Maxsize::Bounded(n),
            None => Maxsize::Unbounded,
        }
    }
}

/// Validated bridge from untyped integers (a configuration file, a wire
/// value). A negative maxsize is a programming error and is rejected here,
/// at construction time, not deferred to first use.
impl TryFrom<i64> for Maxsize {
    type Error = CacheError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        if n < 0 {
            Err(CacheError::CapacityMisconfigured(n))
        } else {
            Ok(Maxsize::Bounded(n as usize))
        }
    }
}

impl fmt::Display for Maxsize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Maxsize::Bounded(n) => write!(f, "{}", n),
            Maxsize::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// What to do when an argument cannot participate in key construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhashablePolicy {
    /// Fail the call immediately with `CacheError::UnhashableArgument`.
    #[default]
    Error,

    /// Proceed uncached, emitting a warning through `tracing`.
    /// A miss is recorded in the statistics.
    Warning,

    /// Proceed uncached, silently. A miss is recorded in the statistics.
    Ignore,
}

/// Configuration for creating a new memoized cache.
///
/// Defaults match the classic LRU cache decorator: `maxsize` 128, untyped
/// keys, no state, and the `Error` unhashable policy.
///
/// # Example
/// ```
/// use fastmemo::{ArgValue, MemoConfig, UnhashablePolicy};
///
/// let config = MemoConfig::new()
///     .maxsize(325)
///     .typed(true)
///     .state(vec![ArgValue::Int(1)])
///     .unhashable(UnhashablePolicy::Ignore)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoConfig {
    /// Maximum number of resident entries.
    pub(crate) maxsize: Maxsize,

    /// Whether keys distinguish argument types as well as values.
    pub(crate) typed: bool,

    /// Values folded into every key, used to partition the cache on
    /// external context changes.
    pub(crate) state: Vec<ArgValue>,

    /// Policy for arguments that cannot be hashed.
    pub(crate) unhashable: UnhashablePolicy,
}

impl MemoConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of resident entries.
    ///
    /// Accepts a count, `Maxsize::Unbounded`, or an `Option<usize>` where
    /// `None` means unbounded.
    pub fn maxsize(mut self, maxsize: impl Into<Maxsize>) -> Self {
        self.maxsize = maxsize.into();
        self
    }

    /// Disable eviction entirely.
    pub fn unbounded(mut self) -> Self {
        self.maxsize = Maxsize::Unbounded;
        self
    }

    /// Distinguish arguments by runtime type as well as value.
    ///
    /// When enabled, `f(3)` and `f(3.0)` occupy distinct cache slots.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Fold these values into every key, in order.
    ///
    /// Changing any element changes every subsequently built key,
    /// effectively partitioning the cache.
    pub fn state(mut self, state: Vec<ArgValue>) -> Self {
        self.state = state;
        self
    }

    /// Set the policy for unhashable arguments.
    pub fn unhashable(mut self, policy: UnhashablePolicy) -> Self {
        self.unhashable = policy;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Get the configured maxsize.
    pub fn get_maxsize(&self) -> Maxsize {
        self.maxsize
    }

    /// Whether typed keys are enabled.
    pub fn get_typed(&self) -> bool {
        self.typed
    }

    /// Get the configured state sequence.
    pub fn get_state(&self) -> &[ArgValue] {
        &self.state
    }

    /// Get the configured unhashable policy.
    pub fn get_unhashable(&self) -> UnhashablePolicy {
        self.unhashable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MemoConfig::default();
        assert_eq!(config.maxsize, Maxsize::Bounded(128));
        assert!(!config.typed);
        assert!(config.state.is_empty());
        assert_eq!(config.unhashable, UnhashablePolicy::Error);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MemoConfig::new()
            .maxsize(1000)
            .typed(true)
            .state(vec![ArgValue::Int(1)])
            .unhashable(UnhashablePolicy::Warning)
            .build();

        assert_eq!(config.get_maxsize(), Maxsize::Bounded(1000));
        assert!(config.get_typed());
        assert_eq!(config.get_state(), &[ArgValue::Int(1)]);
        assert_eq!(config.get_unhashable(), UnhashablePolicy::Warning);
    }

    #[test]
    fn test_unbounded() {
        let config = MemoConfig::new().unbounded().build();
        assert!(config.get_maxsize().is_unbounded());
        assert_eq!(config.get_maxsize().limit(), None);

        let config = MemoConfig::new().maxsize(None).build();
        assert!(config.get_maxsize().is_unbounded());
    }

    #[test]
    fn test_zero_maxsize_is_valid() {
        let config = MemoConfig::new().maxsize(0).build();
        assert_eq!(config.get_maxsize(), Maxsize::Bounded(0));
    }

    #[test]
    fn test_negative_maxsize_is_rejected() {
        assert_eq!(
            Maxsize::try_from(-1i64),
            Err(CacheError::CapacityMisconfigured(-1))
        );
        assert_eq!(Maxsize::try_from(0i64), Ok(Maxsize::Bounded(0)));
        assert_eq!(Maxsize::try_from(128i64), Ok(Maxsize::Bounded(128)));
    }

    #[test]
    fn test_maxsize_display() {
        assert_eq!(format!("{}", Maxsize::Bounded(128)), "128");
        assert_eq!(format!("{}", Maxsize::Unbounded), "unbounded");
    }
}
