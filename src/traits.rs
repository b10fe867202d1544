//! The disposal contract stored values must satisfy.
//!
//! The cache does not interpret or transform the values it stores; it only
//! indexes them and, on removal, calls their disposer. [`Dispose`] is that
//! single collaborator contract: an asynchronous, fallible teardown hook.
//!
//! ## Contract
//!
//! - The cache invokes `dispose` **exactly once** per distinct removal
//!   (explicit remove, capacity eviction, or bulk teardown) — never for a
//!   `get`, never twice for the same entry.
//! - Disposal runs only after the entry has been detached from the cache's
//!   index and recency list, so a later `get`/`insert` can never observe a
//!   value mid-teardown.
//! - Storing a value hands it over to the cache; callers must not dispose
//!   it themselves afterwards.
//! - A disposer failure is propagated verbatim; the cache never inspects
//!   [`Error`](Dispose::Error).

use std::sync::Arc;

use async_trait::async_trait;

/// Asynchronous, fallible teardown hook for cached values.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use evictkit::traits::Dispose;
///
/// struct PooledConnection {
///     // ...
/// }
///
/// #[async_trait]
/// impl Dispose for PooledConnection {
///     type Error = std::io::Error;
///
///     async fn dispose(&self) -> Result<(), Self::Error> {
///         // flush buffers, hand the socket back, ...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Dispose {
    /// Failure reported by the disposer. Propagated by the cache, never
    /// interpreted.
    type Error: Send;

    /// Tears the value down. Invoked by the cache exactly once per removal.
    async fn dispose(&self) -> Result<(), Self::Error>;
}

/// Shared handles dispose through the underlying value.
///
/// Lets the shared cache wrapper hand out `Arc<V>` clones while the cache
/// itself still triggers the one disposal; clones held by callers keep the
/// value alive but must not dispose it again.
#[async_trait]
impl<T> Dispose for Arc<T>
where
    T: Dispose + Send + Sync,
{
    type Error = T::Error;

    async fn dispose(&self) -> Result<(), Self::Error> {
        self.as_ref().dispose().await
    }
}
