//! Bounded "seen content" set for one run.
//!
//! Arena of nodes linked in recency order plus a key → slot index. Eviction reuses
//! the least recently used slot, so memory never grows past `capacity` entries.
use std::collections::HashMap;

type Key = [u8; 32];

#[derive(Debug)]
struct Node {
    key: Key,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct SeenSet {
    capacity: usize,
    index: HashMap<Key, usize>,
    arena: Vec<Node>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
}

impl SeenSet {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            arena: Vec::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.arena[slot].prev, self.arena[slot].next);
        match prev {
            Some(p) => self.arena[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena[n].prev = prev,
            None => self.tail = prev,
        }
        self.arena[slot].prev = None;
        self.arena[slot].next = None;
    }

    fn push_front(&mut self, slot: usize) {
        self.arena[slot].prev = None;
        self.arena[slot].next = self.head;
        if let Some(h) = self.head {
            self.arena[h].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    /// Record `key` as most recently seen. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, key: Key) -> bool {
        if let Some(&slot) = self.index.get(&key) {
            self.unlink(slot);
            self.push_front(slot);
            return false;
        }
        let slot = if self.arena.len() < self.capacity {
            self.arena.push(Node {
                key,
                prev: None,
                next: None,
            });
            self.arena.len() - 1
        } else {
            // Full: recycle the least recently used slot
            let Some(lru) = self.tail else {
                return false;
            };
            self.unlink(lru);
            let old = std::mem::replace(&mut self.arena[lru].key, key);
            self.index.remove(&old);
            lru
        };
        self.index.insert(key, slot);
        self.push_front(slot);
        true
    }
}
