//! Eviction policy: recency-ordered core with asynchronous disposal.

pub mod disposing_lru;

pub use disposing_lru::{
    DisposingLruCore, SharedDisposingLru, DEFAULT_DISPOSE_CONCURRENCY,
};
