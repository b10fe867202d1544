//! Convenience re-exports for common usage.

pub use crate::builder::CacheBuilder;
pub use crate::error::{CacheError, ConfigError};
pub use crate::policy::disposing_lru::{
    DisposingLruCore, SharedDisposingLru, DEFAULT_DISPOSE_CONCURRENCY,
};
pub use crate::traits::Dispose;
