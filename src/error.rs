//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (zero capacity, zero disposal window).
//! - [`CacheError`]: Returned by mutating cache operations. Distinguishes
//!   "key not found" from "disposer failed", since callers typically react
//!   very differently (ignore vs. alert).

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors and builder `try_build()` methods.
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use evictkit::policy::disposing_lru::DisposingLruCore;
///
/// let err = DisposingLruCore::<u64, ()>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by mutating cache operations.
///
/// `E` is the disposer's error type; the cache never inspects it beyond
/// carrying it back to the caller. Structural bookkeeping (index, recency
/// list, length) is always updated *before* a disposer runs, so a
/// [`Disposal`](CacheError::Disposal) failure never leaves the cache's
/// indexing structures inconsistent — only the value's own teardown may be
/// incomplete.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum CacheError<E> {
    /// `remove` targeted a key with no live entry. Recoverable; callers that
    /// don't care whether the entry existed treat this as a benign no-op.
    /// No disposer was invoked.
    #[error("no live entry under the requested key")]
    MissingKey,

    /// A value's disposer failed during a remove, eviction, or bulk
    /// teardown. The entry's removal (where one happened) is final and is
    /// not rolled back.
    #[error("value disposer reported a failure")]
    Disposal(E),
}

impl<E> CacheError<E> {
    /// Returns `true` for the missing-key condition.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, CacheError::MissingKey)
    }

    /// Returns the disposer failure, if that is what this error is.
    pub fn into_disposal(self) -> Option<E> {
        match self {
            CacheError::MissingKey => None,
            CacheError::Disposal(err) => Some(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
