//! Cache builder: capacity plus disposal tuning in one place.
//!
//! ## Example
//!
//! ```
//! use async_trait::async_trait;
//! use evictkit::builder::CacheBuilder;
//! use evictkit::traits::Dispose;
//!
//! struct Blob;
//!
//! #[async_trait]
//! impl Dispose for Blob {
//!     type Error = std::io::Error;
//!     async fn dispose(&self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut cache = CacheBuilder::new(100)
//!     .dispose_concurrency(4)
//!     .try_build::<u64, Blob>()
//!     .unwrap();
//! cache.insert(1, Blob).await.unwrap();
//! assert_eq!(cache.len(), 1);
//! # });
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::disposing_lru::{
    DisposingLruCore, SharedDisposingLru, DEFAULT_DISPOSE_CONCURRENCY,
};
use crate::traits::Dispose;

/// Builder for cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    dispose_concurrency: usize,
}

impl CacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            dispose_concurrency: DEFAULT_DISPOSE_CONCURRENCY,
        }
    }

    /// Sets the bulk-teardown concurrency window (default 10).
    pub fn dispose_concurrency(mut self, limit: usize) -> Self {
        self.dispose_concurrency = limit;
        self
    }

    /// Builds a single-threaded cache core.
    ///
    /// Fails with [`ConfigError`] if the capacity or disposal window is
    /// zero.
    pub fn try_build<K, V>(self) -> Result<DisposingLruCore<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        DisposingLruCore::try_with_config(self.capacity, self.dispose_concurrency)
    }

    /// Builds a clonable shared cache that serializes overlapping
    /// operations.
    pub fn try_build_shared<K, V>(self) -> Result<SharedDisposingLru<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Dispose + Send + Sync,
    {
        SharedDisposingLru::try_with_config(self.capacity, self.dispose_concurrency)
    }
}
