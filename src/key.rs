//! Argument normalization and cache key construction.
//!
//! This module turns the positional and keyword arguments of a call into a
//! single hashable [`CacheKey`]. Keyword arguments are sorted by name so the
//! order they were supplied in never affects the key, optional per-argument
//! type tags make `f(3)` and `f(3.0)` distinct in typed mode, and a
//! configured state sequence is folded into every key so the cache can be
//! partitioned on external context.

use bytes::Bytes;

use crate::config::UnhashablePolicy;
use crate::error::{CacheError, CacheResult};

/// A call argument value.
///
/// Arguments are represented as a small sum type so that any mix of values
/// can flow through one cache. `Opaque` stands in for a value that has no
/// hashable representation (a connection handle, a closure, a mutable
/// buffer); what happens to such calls is decided by the configured
/// [`UnhashablePolicy`].
///
/// # Example
/// ```
/// use fastmemo::ArgValue;
///
/// let a: ArgValue = 42i64.into();
/// let b: ArgValue = "hello".into();
/// let c: ArgValue = vec![ArgValue::Int(1), ArgValue::Int(2)].into();
/// assert_eq!(a.type_name(), "int");
/// assert_eq!(b.type_name(), "str");
/// assert_eq!(c.type_name(), "list");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// The unit value.
    Unit,

    /// A boolean.
    Bool(bool),

    /// A signed integer.
    Int(i64),

    /// An unsigned integer. Values that fit `i64` key identically to `Int`.
    Uint(u64),

    /// A floating-point number. Integral, finite values key identically to
    /// the corresponding `Int`; everything else keys on its bit pattern.
    Float(f64),

    /// A string.
    Str(String),

    /// A byte payload.
    Bytes(Bytes),

    /// An ordered sequence of values.
    List(Vec<ArgValue>),

    /// A value with no hashable representation. The label is used in
    /// diagnostics only and never participates in key material.
    Opaque(String),
}

impl ArgValue {
    /// The type tag folded into keys in typed mode.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Unit => "unit",
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Uint(_) => "uint",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "str",
            ArgValue::Bytes(_) => "bytes",
            ArgValue::List(_) => "list",
            ArgValue::Opaque(_) => "opaque",
        }
    }
}

impl From<()> for ArgValue {
    fn from(_: ()) -> Self {
        ArgValue::Unit
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v.into())
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::Int(v.into())
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::Uint(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Bytes> for ArgValue {
    fn from(v: Bytes) -> Self {
        ArgValue::Bytes(v)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(v: Vec<u8>) -> Self {
        ArgValue::Bytes(Bytes::from(v))
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(v: Vec<ArgValue>) -> Self {
        ArgValue::List(v)
    }
}

/// The positional and keyword arguments of one call.
///
/// # Example
/// ```
/// use fastmemo::CallArgs;
///
/// let args = CallArgs::new()
///     .arg(3i64)
///     .arg("label")
///     .kwarg("verbose", true);
/// assert_eq!(args.positional().len(), 2);
/// assert_eq!(args.keyword().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keyword: Vec<(String, ArgValue)>,
}

impl CallArgs {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument. Supply order does not affect the key.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    /// The positional arguments, in call order.
    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    /// The keyword arguments, in supply order.
    pub fn keyword(&self) -> &[(String, ArgValue)] {
        &self.keyword
    }
}

/// One unit of key material.
///
/// Sentinel atoms separate the keyword and state sections so a positional
/// string can never collide with a keyword name or a state value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyAtom {
    Unit,
    Bool(bool),
    Int(i64),
    Uint(u64),
    FloatBits(u64),
    Str(String),
    Bytes(Bytes),
    List(Vec<KeyAtom>),
    Type(&'static str),
    KwMark,
    StateMark,
}

/// An opaque, immutable, hashable identity for one call.
///
/// Built by [`KeyBuilder::build`]; equal inputs always produce keys that
/// compare equal and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    atoms: Vec<KeyAtom>,
}

/// The result of key construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The call is cacheable under this key.
    Key(CacheKey),

    /// The call cannot be cached (an opaque value was present and the
    /// policy is `Warning` or `Ignore`). The caller is expected to invoke
    /// the computation uncached and record a miss.
    Uncacheable,
}

/// Builds cache keys from call arguments.
///
/// Configured once per cache with the typed flag, the state sequence, and
/// the unhashable policy. Key construction is a pure function of its
/// inputs: no hidden mutation, no randomization.
///
/// # Example
/// ```
/// use fastmemo::{CallArgs, KeyBuilder, KeyOutcome, UnhashablePolicy};
///
/// let builder = KeyBuilder::new(false, Vec::new(), UnhashablePolicy::Error);
///
/// // Keyword order never matters.
/// let k1 = builder.build(&CallArgs::new().kwarg("a", 1i64).kwarg("b", 2i64)).unwrap();
/// let k2 = builder.build(&CallArgs::new().kwarg("b", 2i64).kwarg("a", 1i64)).unwrap();
/// assert_eq!(k1, k2);
/// ```
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    typed: bool,
    state: Vec<ArgValue>,
    policy: UnhashablePolicy,
}

impl KeyBuilder {
    /// Create a builder.
    ///
    /// `typed` folds the runtime type of every top-level argument into the
    /// key; `state` is appended verbatim and in order to every key built.
    pub fn new(typed: bool, state: Vec<ArgValue>, policy: UnhashablePolicy) -> Self {
        Self {
            typed,
            state,
            policy,
        }
    }

    /// Build the key for one call.
    ///
    /// An opaque value anywhere in the materials triggers the configured
    /// policy: `Error` fails the call, `Warning` logs and reports the call
    /// as uncacheable, `Ignore` reports it uncacheable silently. A
    /// best-effort key is never produced.
    pub fn build(&self, args: &CallArgs) -> CacheResult<KeyOutcome> {
        match self.try_build(args) {
            Ok(key) => Ok(KeyOutcome::Key(key)),
            Err(label) => match self.policy {
                UnhashablePolicy::Error => Err(CacheError::UnhashableArgument(label)),
                UnhashablePolicy::Warning => {
                    tracing::warn!(argument = %label, "unhashable argument, call will not be cached");
                    Ok(KeyOutcome::Uncacheable)
                }
                UnhashablePolicy::Ignore => Ok(KeyOutcome::Uncacheable),
            },
        }
    }

    /// Whether typed mode is enabled.
    pub fn is_typed(&self) -> bool {
        self.typed
    }

    /// The configured state sequence.
    pub fn state(&self) -> &[ArgValue] {
        &self.state
    }

    fn try_build(&self, args: &CallArgs) -> Result<CacheKey, String> {
        let mut atoms = Vec::with_capacity(
            2 * (args.positional().len() + args.keyword().len() + self.state.len()) + 2,
        );

        for value in args.positional() {
            atoms.push(normalize(value)?);
            if self.typed {
                atoms.push(KeyAtom::Type(value.type_name()));
            }
        }

        if !args.keyword().is_empty() {
            atoms.push(KeyAtom::KwMark);
            let mut keyword: Vec<&(String, ArgValue)> = args.keyword().iter().collect();
            keyword.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, value) in keyword {
                atoms.push(KeyAtom::Str(name.clone()));
                atoms.push(normalize(value)?);
                if self.typed {
                    atoms.push(KeyAtom::Type(value.type_name()));
                }
            }
        }

        if !self.state.is_empty() {
            atoms.push(KeyAtom::StateMark);
            for value in &self.state {
                atoms.push(normalize(value)?);
            }
        }

        Ok(CacheKey { atoms })
    }
}

/// Largest magnitude at which every integral f64 is exact (2^53).
const FLOAT_INT_BOUND: f64 = 9_007_199_254_740_992.0;

/// Normalize one value into key material.
///
/// Integral finite floats and i64-range unsigned integers fold to `Int` so
/// that `3`, `3u64`, and `3.0` key identically when untyped; in typed mode
/// the top-level type tags keep them apart. Normalization recurses through
/// lists, matching the original behavior of tagging only top-level types.
fn normalize(value: &ArgValue) -> Result<KeyAtom, String> {
    match value {
        ArgValue::Unit => Ok(KeyAtom::Unit),
        ArgValue::Bool(b) => Ok(KeyAtom::Bool(*b)),
        ArgValue::Int(i) => Ok(KeyAtom::Int(*i)),
        ArgValue::Uint(u) => {
            if *u <= i64::MAX as u64 {
                Ok(KeyAtom::Int(*u as i64))
            } else {
                Ok(KeyAtom::Uint(*u))
            }
        }
        ArgValue::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() <= FLOAT_INT_BOUND {
                Ok(KeyAtom::Int(*f as i64))
            } else {
                Ok(KeyAtom::FloatBits(f.to_bits()))
            }
        }
        ArgValue::Str(s) => Ok(KeyAtom::Str(s.clone())),
        ArgValue::Bytes(b) => Ok(KeyAtom::Bytes(b.clone())),
        ArgValue::List(items) => {
            let atoms = items.iter().map(normalize).collect::<Result<Vec<_>, _>>()?;
            Ok(KeyAtom::List(atoms))
        }
        ArgValue::Opaque(label) => Err(label.clone()),
    }
}
