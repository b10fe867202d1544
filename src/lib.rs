//! evictkit: bounded LRU cache with an asynchronous, fallible disposal
//! protocol.
//!
//! Every value removed from the cache — by explicit removal, by capacity
//! eviction, or by full-cache teardown — has its [`Dispose`] hook invoked
//! exactly once, after the structural removal has already committed.
//!
//! See `DESIGN.md` for internal architecture and invariants.
//!
//! [`Dispose`]: crate::traits::Dispose

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;
