//! Internal data structures: entry arena and recency ordering.

pub mod recency_list;
pub mod slot_arena;

pub use recency_list::RecencyList;
pub use slot_arena::{EntryId, SlotArena};
