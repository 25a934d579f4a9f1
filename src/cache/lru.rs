//! LRU List Module
//!
//! Recency-ordered storage for cache entries with O(1) reordering.

use crate::cache::CacheEntry;

#[derive(Debug)]
struct Node {
    entry: Option<CacheEntry>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Doubly linked list of cache entries addressed by slot handles.
///
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Nodes live in a slab so a handle stays valid until its entry is removed.
/// Freed slots are recycled by later inserts.
#[derive(Debug, Default)]
pub struct LruList {
    slots: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used and returns its handle.
    pub fn push_front(&mut self, entry: CacheEntry) -> usize {
        let node = Node {
            entry: Some(entry),
            prev: None,
            next: self.head,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        };
        match self.head {
            Some(old) => self.slots[old].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the entry behind `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) || !self.is_occupied(idx) {
            return;
        }
        self.unlink(idx);
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        match self.head {
            Some(old) => self.slots[old].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    // == Remove ==
    /// Unlinks and returns the entry behind `idx`, freeing its slot.
    pub fn remove(&mut self, idx: usize) -> Option<CacheEntry> {
        if !self.is_occupied(idx) {
            return None;
        }
        self.unlink(idx);
        let entry = self.slots[idx].entry.take();
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
        self.free.push(idx);
        self.len -= 1;
        entry
    }

    // == Pop Back ==
    /// Returns and removes the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    pub fn back(&self) -> Option<&CacheEntry> {
        self.tail.and_then(|idx| self.get(idx))
    }

    pub fn get(&self, idx: usize) -> Option<&CacheEntry> {
        self.slots.get(idx).and_then(|node| node.entry.as_ref())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CacheEntry> {
        self.slots.get_mut(idx).and_then(|node| node.entry.as_mut())
    }

    // == Drain ==
    /// Removes every entry, yielding them from back (oldest) to front.
    pub fn drain(&mut self) -> Vec<CacheEntry> {
        let mut drained = Vec::with_capacity(self.len);
        while let Some(entry) = self.pop_back() {
            drained.push(entry);
        }
        self.slots.clear();
        self.free.clear();
        drained
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iterate ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let node = &self.slots[idx];
            cursor = node.next;
            node.entry.as_ref()
        })
    }

    fn is_occupied(&self, idx: usize) -> bool {
        self.slots.get(idx).is_some_and(|node| node.entry.is_some())
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }
}
