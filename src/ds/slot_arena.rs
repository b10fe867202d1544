//! Arena of cache entries addressed by stable ids.
//!
//! Entries never move once inserted: an [`EntryId`] stays valid until the
//! entry it names is removed, and removal of one entry never invalidates the
//! ids of others. Vacant slots are chained into an intrusive free list and
//! reused by later insertions, so a cache that churns at capacity allocates
//! no new slots in steady state.

/// Stable handle for an entry in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// Slot-based arena with free-list reuse.
///
/// Backs the recency list: list nodes live here and link to each other by
/// [`EntryId`], which avoids both reference cycles and dangling links.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Creates an empty arena with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Inserts a value and returns its stable id.
    pub fn insert(&mut self, value: T) -> EntryId {
        let idx = match self.free_head {
            Some(idx) => {
                let next_free = match self.slots[idx] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot"),
                };
                self.free_head = next_free;
                self.slots[idx] = Slot::Occupied(value);
                idx
            },
            None => {
                self.slots.push(Slot::Occupied(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        EntryId(idx)
    }

    /// Removes the entry under `id`, returning its value.
    ///
    /// The freed slot becomes available for reuse. Returns `None` if `id`
    /// does not name a live entry.
    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        match self.slots.get_mut(id.0) {
            Some(slot @ Slot::Occupied(_)) => {
                let taken = std::mem::replace(
                    slot,
                    Slot::Vacant {
                        next_free: self.free_head,
                    },
                );
                self.free_head = Some(id.0);
                self.len -= 1;
                match taken {
                    Slot::Occupied(value) => Some(value),
                    Slot::Vacant { .. } => unreachable!(),
                }
            },
            _ => None,
        }
    }

    /// Returns a reference to the entry under `id`, if live.
    pub fn get(&self, id: EntryId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the entry under `id`, if live.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if `id` names a live entry.
    pub fn contains(&self, id: EntryId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Occupied(_)))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries and forgets the free list.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
