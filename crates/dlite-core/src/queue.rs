//! # Open List
//!
//! An indexed binary min-heap of inconsistent vertices.
//!
//! A plain `BinaryHeap` only exposes its minimum. Vertex updates touch
//! arbitrary queued vertices, so the heap keeps a position index
//! (`VertexId -> slot`) that makes `fix` and `remove` O(log n).
//!
//! ## Invariants
//! - A vertex appears at most once
//! - `index[v] == i` iff `entries[i].vertex == v`
//! - `entries[parent(i)].key` is never greater than `entries[i].key`

use crate::{Key, PlannerError, VertexId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A queued vertex together with its current key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    /// The queued vertex.
    pub vertex: VertexId,
    /// Its priority.
    pub key: Key,
}

/// Incremental priority queue keyed by [`Key`].
#[derive(Debug, Clone, Default)]
pub struct OpenList {
    entries: Vec<Entry>,
    index: BTreeMap<VertexId, usize>,
}

impl OpenList {
    /// Create an empty open list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a vertex is queued.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.index.contains_key(&vertex)
    }

    /// Current key of a queued vertex.
    #[must_use]
    pub fn key_of(&self, vertex: VertexId) -> Option<Key> {
        self.index.get(&vertex).map(|&i| self.entries[i].key)
    }

    /// Insert a vertex that is not yet queued.
    pub fn push(&mut self, vertex: VertexId, key: Key) -> Result<(), PlannerError> {
        if self.contains(vertex) {
            return Err(PlannerError::AlreadyQueued(vertex));
        }
        let slot = self.entries.len();
        self.entries.push(Entry { vertex, key });
        self.index.insert(vertex, slot);
        self.sift_up(slot);
        Ok(())
    }

    /// Smallest entry, without removing it.
    #[must_use]
    pub fn peek_min(&self) -> Option<Entry> {
        self.entries.first().copied()
    }

    /// Key of the smallest entry, or [`Key::INFINITE`] when empty.
    #[must_use]
    pub fn top_key(&self) -> Key {
        self.peek_min().map_or(Key::INFINITE, |e| e.key)
    }

    /// Remove and return the smallest entry.
    pub fn pop_min(&mut self) -> Option<Entry> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Replace the key of a queued vertex. No-op if absent.
    pub fn fix(&mut self, vertex: VertexId, key: Key) {
        if let Some(&slot) = self.index.get(&vertex) {
            self.entries[slot].key = key;
            self.restore(slot);
        }
    }

    /// Remove a queued vertex. No-op if absent.
    pub fn remove(&mut self, vertex: VertexId) -> Option<Entry> {
        let slot = *self.index.get(&vertex)?;
        Some(self.remove_at(slot))
    }

    /// Queued vertices in heap order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    fn remove_at(&mut self, slot: usize) -> Entry {
        let last = self.entries.len() - 1;
        self.swap(slot, last);
        let removed = self.entries.swap_remove(last);
        self.index.remove(&removed.vertex);
        if slot < self.entries.len() {
            self.restore(slot);
        }
        removed
    }

    fn restore(&mut self, slot: usize) {
        if !self.sift_up(slot) {
            self.sift_down(slot);
        }
    }

    /// Returns true if the entry moved.
    fn sift_up(&mut self, mut slot: usize) -> bool {
        let start = slot;
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot != start
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    // Ties on the key fall back to vertex identity so the pop order is stable.
    fn less(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.entries[a], &self.entries[b]);
        ea.key
            .compare(&eb.key)
            .then_with(|| ea.vertex.cmp(&eb.vertex))
            == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.index.insert(self.entries[a].vertex, a);
        self.index.insert(self.entries[b].vertex, b);
    }
}

// =============================================================================
// TESTS
// =============================================================================
