//! Recency ordering backed by [`SlotArena`].
//!
//! A doubly linked list whose nodes live in the arena and link to each other
//! by [`EntryId`], front = most recently used, back = least recently used.
//! Stable handles make every splice O(1) with no pointer chasing and no
//! `unsafe`.
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌─────────┬────────────────────────────────────────────┐
//!   │ EntryId │ Node { value, prev, next }                 │
//!   ├─────────┼────────────────────────────────────────────┤
//!   │ id_1    │ { value: A, prev: None, next: Some(id_2) } │
//!   │ id_2    │ { value: B, prev: id_1, next: id_3 }       │
//!   │ id_3    │ { value: C, prev: id_2, next: None }       │
//!   └─────────┴────────────────────────────────────────────┘
//!
//!   front ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── back
//!   (MRU)                                       (LRU)
//! ```
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{EntryId, SlotArena};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

/// Doubly linked recency list over arena-allocated nodes.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: SlotArena<Node<T>>,
    front: Option<EntryId>,
    back: Option<EntryId>,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            front: None,
            back: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            front: None,
            back: None,
        }
    }

    /// Number of nodes in the list.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` names a live node.
    pub fn contains(&self, id: EntryId) -> bool {
        self.arena.contains(id)
    }

    /// Id of the most recently used node.
    pub fn front_id(&self) -> Option<EntryId> {
        self.front
    }

    /// Id of the least recently used node.
    pub fn back_id(&self) -> Option<EntryId> {
        self.back
    }

    /// Returns the value for a node id, if present.
    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Returns a mutable reference to a node value, if present.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts a new node at the front (MRU) and returns its id.
    pub fn push_front(&mut self, value: T) -> EntryId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: self.front,
        });
        if let Some(old_front) = self.front {
            if let Some(node) = self.arena.get_mut(old_front) {
                node.prev = Some(id);
            }
        } else {
            self.back = Some(id);
        }
        self.front = Some(id);
        id
    }

    /// Moves an existing node to the front; returns `false` if `id` is not
    /// present. Already-front nodes are left untouched.
    pub fn move_to_front(&mut self, id: EntryId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if Some(id) == self.front {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Removes the node `id` from the list and returns its value.
    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Removes and returns the back (LRU) value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.back?;
        self.remove(id)
    }

    /// Removes all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.front = None;
        self.back = None;
    }

    /// Iterates values from front (MRU) to back (LRU).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.front,
        }
    }

    fn detach(&mut self, id: EntryId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.arena.get_mut(prev_id) {
                    prev_node.next = next;
                }
            },
            None => self.front = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.arena.get_mut(next_id) {
                    next_node.prev = prev;
                }
            },
            None => self.back = prev,
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }

        Some(())
    }

    fn attach_front(&mut self, id: EntryId) {
        let old_front = self.front;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = old_front;
        } else {
            return;
        }
        if let Some(old_front) = old_front {
            if let Some(front_node) = self.arena.get_mut(old_front) {
                front_node.prev = Some(id);
            }
        } else {
            self.back = Some(id);
        }
        self.front = Some(id);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.front.is_none() || self.back.is_none() {
            assert!(self.front.is_none());
            assert!(self.back.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.front;
        let mut prev = None;

        while let Some(id) = current {
            assert!(seen.insert(id), "cycle detected in recency list");
            let node = self.arena.get(id).expect("linked node missing from arena");
            assert_eq!(node.prev, prev, "broken back-link");
            if node.next.is_none() {
                assert_eq!(self.back, Some(id));
            }

            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len());
        }

        assert_eq!(count, self.len());
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back value iterator.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<EntryId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}
