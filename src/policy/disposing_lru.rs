//! # Disposing LRU cache
//!
//! Bounded-size cache that evicts the least recently used entry once
//! capacity is exceeded and invokes each removed value's asynchronous,
//! fallible disposer — on explicit removal, on eviction, and on full-cache
//! teardown.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                    DisposingLruCore<K, V>                     │
//!   │                                                               │
//!   │   ┌─────────────────────────────────────────────────────┐     │
//!   │   │  FxHashMap<K, EntryId>  (lookup table)              │     │
//!   │   └──────────────────────────┬──────────────────────────┘     │
//!   │                              ▼                                │
//!   │   ┌─────────────────────────────────────────────────────┐     │
//!   │   │  RecencyList<CacheEntry<K, V>>                      │     │
//!   │   │                                                     │     │
//!   │   │  front ─► [MRU] ◄──► [..] ◄──► [LRU] ◄── back       │     │
//!   │   └─────────────────────────────────────────────────────┘     │
//!   │                              │ removed values                 │
//!   │                              ▼                                │
//!   │   ┌─────────────────────────────────────────────────────┐     │
//!   │   │  Disposal: value.dispose().await                    │     │
//!   │   │  (bounded fan-out window for dispose_all)           │     │
//!   │   └─────────────────────────────────────────────────────┘     │
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method             | Complexity | Suspends | Description                         |
//! |--------------------|------------|----------|-------------------------------------|
//! | `try_new(cap)`     | O(1)       | no       | Fallible constructor, `cap >= 1`    |
//! | `get(&k)`          | O(1)       | no       | Hit promotes to MRU; miss is `None` |
//! | `insert(k, v)`     | O(1)*      | yes      | Replace + insert + maybe evict      |
//! | `remove(&k)`       | O(1)*      | yes      | Unlink, then await the disposer     |
//! | `dispose_all()`    | O(n)       | yes      | Bounded-concurrency bulk teardown   |
//! | `peek(&k)`         | O(1)       | no       | Lookup without promotion            |
//!
//! \* plus whatever the value's disposer costs.
//!
//! ## Disposal protocol
//!
//! Structural bookkeeping (lookup table, recency list, length) is always
//! updated *before* a disposer runs. A disposer failure is surfaced to the
//! caller of the triggering operation but never rolls the removal back, so
//! the cache's indexing structures stay consistent even when teardown of a
//! value fails or stalls.
//!
//! ## Concurrency model
//!
//! `DisposingLruCore` is single-logical-thread: `&mut self` on every
//! mutation means the borrow checker already serializes operations on one
//! instance. [`SharedDisposingLru`] is the clonable handle for callers that
//! issue overlapping operations: it queues them through an async mutex whose
//! guard is held across disposal awaits, so a second operation can never
//! observe state mid-mutation from a first one suspended in a disposer.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::ds::{EntryId, RecencyList};
use crate::error::{CacheError, ConfigError};
use crate::traits::Dispose;

/// Default ceiling on concurrently running disposers during bulk teardown.
pub const DEFAULT_DISPOSE_CONCURRENCY: usize = 10;

/// One live key/value pair; its recency position is the list node it
/// occupies.
struct CacheEntry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded disposing LRU core: lookup table + recency list +
/// capacity enforcement.
///
/// Values are handed over to the cache on insertion; the cache triggers
/// their disposal exactly once, on whichever removal path takes them out.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use evictkit::policy::disposing_lru::DisposingLruCore;
/// use evictkit::traits::Dispose;
///
/// struct Session(u32);
///
/// #[async_trait]
/// impl Dispose for Session {
///     type Error = std::io::Error;
///     async fn dispose(&self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut cache = DisposingLruCore::try_new(2).unwrap();
/// cache.insert("a", Session(1)).await.unwrap();
/// cache.insert("b", Session(2)).await.unwrap();
/// assert!(cache.get(&"a").is_some());
///
/// // "b" is now least recently used and gets evicted (and disposed).
/// cache.insert("c", Session(3)).await.unwrap();
/// assert!(cache.get(&"b").is_none());
/// # });
/// ```
pub struct DisposingLruCore<K, V>
where
    K: Eq + Hash,
{
    index: FxHashMap<K, EntryId>,
    order: RecencyList<CacheEntry<K, V>>,
    capacity: usize,
    dispose_concurrency: usize,
}

impl<K, V> DisposingLruCore<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries, with the default
    /// bulk-disposal window of [`DEFAULT_DISPOSE_CONCURRENCY`].
    ///
    /// Fails with [`ConfigError`] if `capacity` is zero: a cache that could
    /// never hold the entry it just inserted has no meaningful eviction
    /// semantics.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_config(capacity, DEFAULT_DISPOSE_CONCURRENCY)
    }

    /// Creates a cache with an explicit bulk-disposal concurrency window.
    pub fn try_with_config(
        capacity: usize,
        dispose_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be at least 1"));
        }
        if dispose_concurrency == 0 {
            return Err(ConfigError::new("dispose concurrency must be at least 1"));
        }
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: RecencyList::with_capacity(capacity),
            capacity,
            dispose_concurrency,
        })
    }

    /// Looks up `key` and, on a hit, marks the entry most recently used.
    ///
    /// A miss is a normal outcome, not an error. No disposal side effect,
    /// no suspension.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.move_to_front(id);
        trace!("cache hit; entry promoted to most recently used");
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without touching the recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Maximum number of entries, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bulk-disposal window used by [`dispose_all`](Self::dispose_all).
    pub fn dispose_concurrency(&self) -> usize {
        self.dispose_concurrency
    }

    /// Iterates live entries from most to least recently used, without
    /// promoting anything.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Validate internal invariants (debug builds only).
    fn validate_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            self.order.debug_validate_invariants();
            assert_eq!(self.index.len(), self.order.len());
            assert!(self.order.len() <= self.capacity);
            for (key, &id) in &self.index {
                let entry = self.order.get(id).expect("indexed entry missing from list");
                assert!(entry.key == *key, "index points at entry with another key");
            }
        }
    }
}

impl<K, V> DisposingLruCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Dispose + Send + Sync,
{
    /// Inserts `value` under `key`, making it the most recently used entry.
    ///
    /// Three steps, in order:
    ///
    /// 1. If `key` is already live, its old entry is removed from the
    ///    structure and the old value's disposer is awaited. If that
    ///    disposer fails, the insert aborts with
    ///    [`CacheError::Disposal`] — the old entry stays removed (removal
    ///    is never rolled back) and the new value is not inserted.
    /// 2. The new entry is inserted at the most-recently-used position.
    /// 3. If the cache is now over capacity, the least recently used entry
    ///    is removed and its disposer awaited. A failure there also
    ///    surfaces as [`CacheError::Disposal`], but the eviction has
    ///    already structurally completed.
    ///
    /// On success `len() <= capacity()` holds and the new entry is the
    /// most recently used. At most one entry is evicted per call: growth
    /// only ever comes from this insertion and `capacity >= 1`.
    pub async fn insert(&mut self, key: K, value: V) -> Result<(), CacheError<V::Error>> {
        if let Some(id) = self.index.remove(&key) {
            if let Some(stale) = self.order.remove(id) {
                self.validate_invariants();
                trace!("key already live; disposing the value being replaced");
                stale.value.dispose().await.map_err(CacheError::Disposal)?;
            }
        }

        let id = self.order.push_front(CacheEntry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        if self.order.len() > self.capacity {
            self.evict_lru().await?;
        }

        self.validate_invariants();
        Ok(())
    }

    /// Removes the entry under `key` and awaits its disposer.
    ///
    /// An absent key fails with [`CacheError::MissingKey`] and never
    /// invokes a disposer. For a live key the entry is unlinked from the
    /// recency list and deleted from the lookup table *before* the disposer
    /// runs; a disposer failure is surfaced but the removal is final.
    pub async fn remove(&mut self, key: &K) -> Result<(), CacheError<V::Error>> {
        let Some(id) = self.index.remove(key) else {
            return Err(CacheError::MissingKey);
        };
        // index and list are mutated together, so a hit in one is a hit in
        // the other
        let Some(removed) = self.order.remove(id) else {
            debug_assert!(false, "indexed entry missing from recency list");
            return Err(CacheError::MissingKey);
        };
        self.validate_invariants();

        debug!(len = self.order.len(), "entry removed; awaiting its disposer");
        removed.value.dispose().await.map_err(|err| {
            warn!("disposer failed for explicitly removed entry");
            CacheError::Disposal(err)
        })
    }

    /// Disposes every live value with the configured concurrency window.
    ///
    /// See [`dispose_all_with_limit`](Self::dispose_all_with_limit).
    pub async fn dispose_all(&self) -> Result<(), CacheError<V::Error>> {
        self.dispose_all_with_limit(self.dispose_concurrency).await
    }

    /// Disposes every live value, running at most `limit` disposers
    /// concurrently.
    ///
    /// Entries are dispatched in most-recently-used-first order (the order
    /// carries no meaning beyond being deterministic). The first disposer
    /// failure is recorded and returned; disposals already in flight are
    /// allowed to finish, but no further disposal is dispatched once a
    /// failure has been observed — entries later in the snapshot may never
    /// be attempted.
    ///
    /// This is a terminal teardown: entries are *not* removed from the
    /// structure, and the cache is not expected to remain usable
    /// afterwards.
    pub async fn dispose_all_with_limit(&self, limit: usize) -> Result<(), CacheError<V::Error>> {
        // A zero-wide window could never dispatch anything.
        let limit = limit.max(1);

        let mut pending = self.order.iter().map(|entry| &entry.value);
        let mut in_flight: FuturesUnordered<_> = pending
            .by_ref()
            .take(limit)
            .map(|value| value.dispose())
            .collect();

        let mut first_failure = None;
        while let Some(result) = in_flight.next().await {
            match result {
                Ok(()) => {
                    if first_failure.is_none() {
                        if let Some(value) = pending.next() {
                            in_flight.push(value.dispose());
                        }
                    }
                },
                Err(err) => {
                    if first_failure.is_none() {
                        warn!("disposer failed during bulk teardown; draining in-flight disposals");
                        first_failure = Some(err);
                    }
                },
            }
        }

        match first_failure {
            None => Ok(()),
            Some(err) => Err(CacheError::Disposal(err)),
        }
    }

    /// Structurally removes the least recently used entry, then awaits its
    /// disposer.
    async fn evict_lru(&mut self) -> Result<(), CacheError<V::Error>> {
        let Some(evicted) = self.order.pop_back() else {
            return Ok(());
        };
        self.index.remove(&evicted.key);

        debug!(len = self.order.len(), "over capacity; evicted least recently used entry");
        evicted.value.dispose().await.map_err(|err| {
            warn!("disposer failed for evicted entry");
            CacheError::Disposal(err)
        })
    }
}

impl<K, V> fmt::Debug for DisposingLruCore<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposingLruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Clonable handle serializing operations on one shared cache instance.
///
/// Values are wrapped in `Arc<V>` internally so lookups can hand out owned
/// handles; the cache still triggers the one disposal per removal through
/// the [`Dispose`] impl for `Arc<V>`, and caller-held clones simply keep the
/// value alive past it.
///
/// Every operation queues through an async mutex whose guard is held across
/// disposal awaits. That is the per-instance operation queue the disposal
/// protocol requires: if `insert(a)` suspends in a disposer, a concurrent
/// `insert(b)` on a clone of this handle waits for `insert(a)` to settle
/// rather than interleaving with its structural mutation.
pub struct SharedDisposingLru<K, V>
where
    K: Eq + Hash,
{
    inner: Arc<Mutex<DisposingLruCore<K, Arc<V>>>>,
}

impl<K, V> Clone for SharedDisposingLru<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for SharedDisposingLru<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDisposingLru").finish_non_exhaustive()
    }
}

impl<K, V> SharedDisposingLru<K, V>
where
    K: Eq + Hash + Clone,
    V: Dispose + Send + Sync,
{
    /// Creates a shared cache holding at most `capacity` entries.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_config(capacity, DEFAULT_DISPOSE_CONCURRENCY)
    }

    /// Creates a shared cache with an explicit bulk-disposal window.
    pub fn try_with_config(
        capacity: usize,
        dispose_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(DisposingLruCore::try_with_config(
                capacity,
                dispose_concurrency,
            )?)),
        })
    }

    /// Looks up `key`, promoting the entry on a hit.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut cache = self.inner.lock().await;
        cache.get(key).map(Arc::clone)
    }

    /// Looks up `key` without promotion.
    pub async fn peek(&self, key: &K) -> Option<Arc<V>> {
        let cache = self.inner.lock().await;
        cache.peek(key).map(Arc::clone)
    }

    /// Inserts a value, wrapping it in `Arc<V>` internally.
    pub async fn insert(&self, key: K, value: V) -> Result<(), CacheError<V::Error>> {
        let mut cache = self.inner.lock().await;
        cache.insert(key, Arc::new(value)).await
    }

    /// Inserts a pre-wrapped `Arc<V>` directly.
    pub async fn insert_arc(&self, key: K, value: Arc<V>) -> Result<(), CacheError<V::Error>> {
        let mut cache = self.inner.lock().await;
        cache.insert(key, value).await
    }

    /// Removes the entry under `key`, awaiting its disposer.
    pub async fn remove(&self, key: &K) -> Result<(), CacheError<V::Error>> {
        let mut cache = self.inner.lock().await;
        cache.remove(key).await
    }

    /// Bulk teardown with the configured window. Terminal use only.
    pub async fn dispose_all(&self) -> Result<(), CacheError<V::Error>> {
        let cache = self.inner.lock().await;
        cache.dispose_all().await
    }

    /// Bulk teardown with an explicit window. Terminal use only.
    pub async fn dispose_all_with_limit(&self, limit: usize) -> Result<(), CacheError<V::Error>> {
        let cache = self.inner.lock().await;
        cache.dispose_all_with_limit(limit).await
    }

    /// Returns `true` if `key` has a live entry.
    pub async fn contains(&self, key: &K) -> bool {
        let cache = self.inner.lock().await;
        cache.contains(key)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let cache = self.inner.lock().await;
        cache.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        let cache = self.inner.lock().await;
        cache.is_empty()
    }

    /// Maximum number of entries.
    pub async fn capacity(&self) -> usize {
        let cache = self.inner.lock().await;
        cache.capacity()
    }
}
