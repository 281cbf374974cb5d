//! LRU Cache Module
//!
//! Byte-budgeted Least Recently Used cache.
//!
//! Entries live in a slot arena linked into a doubly linked recency list:
//! - Head = Most recently used
//! - Tail = Least recently used
//!
//! A key index maps each key to its slot, so lookups, promotions and
//! evictions are all O(1).

use std::collections::HashMap;
use std::fmt;

use crate::cache::{CacheEntry, SizedValue};

/// Sentinel for "no neighbour" in the recency list.
const NIL: usize = usize::MAX;

// == Eviction Observer ==
/// Notified once for every entry the cache evicts.
pub trait EvictionObserver<V>: Send + Sync {
    fn on_evict(&self, key: &str, value: &V);
}

impl<V, F> EvictionObserver<V> for F
where
    F: Fn(&str, &V) + Send + Sync,
{
    fn on_evict(&self, key: &str, value: &V) {
        self(key, value)
    }
}

// == Slot ==
#[derive(Debug)]
struct Slot<V> {
    entry: Option<CacheEntry<V>>,
    prev: usize,
    next: usize,
}

// == LRU Cache ==
/// Least recently used cache bounded by total bytes rather than entry count.
///
/// Each entry is charged `key.len() + value.size()` bytes. A `max_bytes` of
/// zero disables eviction entirely.
pub struct LruCache<V> {
    /// Byte budget, 0 = unbounded
    max_bytes: u64,
    /// Bytes currently charged
    used_bytes: u64,
    /// Arena of entries and their recency links
    slots: Vec<Slot<V>>,
    /// Reusable slot indices
    free: Vec<usize>,
    /// Most recently used slot
    head: usize,
    /// Least recently used slot
    tail: usize,
    /// Key to slot index
    index: HashMap<String, usize>,
    /// Optional eviction callback
    observer: Option<Box<dyn EvictionObserver<V>>>,
}

impl<V: SizedValue> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            index: HashMap::new(),
            observer: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `observer`.
    pub fn with_observer(max_bytes: u64, observer: impl EvictionObserver<V> + 'static) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.observer = Some(Box::new(observer));
        cache
    }

    // == Add ==
    /// Inserts or replaces `key`, making it the most recently used entry.
    ///
    /// Afterwards the least recently used entries are evicted until the
    /// budget holds again. An entry larger than the whole budget is still
    /// admitted first, and may then be evicted by the same call.
    pub fn add(&mut self, key: &str, value: V) {
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            if let Some(entry) = self.slots[idx].entry.as_mut() {
                let old_size = entry.value.size() as u64;
                self.used_bytes = self.used_bytes - old_size + value.size() as u64;
                entry.value = value;
            }
        } else {
            let entry = CacheEntry::new(key.to_string(), value);
            self.used_bytes += entry.footprint();
            let idx = self.alloc(entry);
            self.push_front(idx);
            self.index.insert(key.to_string(), idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.slots[idx].entry.as_ref().map(|entry| &entry.value)
    }

    /// Returns the value for `key` without touching recency.
    #[cfg(test)]
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].entry.as_ref().map(|entry| &entry.value)
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry and returns it.
    ///
    /// Returns None if the cache is empty.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }

        self.unlink(idx);
        self.free.push(idx);
        let entry = self.slots[idx].entry.take()?;
        self.index.remove(&entry.key);
        self.used_bytes -= entry.footprint();

        if let Some(observer) = &self.observer {
            observer.on_evict(&entry.key, &entry.value);
        }

        Some((entry.key, entry.value))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without touching recency.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.slot_key(self.tail)
    }

    // == Contains ==
    /// Checks for `key` without touching recency.
    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys ordered from most to least recently used.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cur = self.head;
        while let Some(key) = self.slot_key(cur) {
            keys.push(key);
            cur = self.slots[cur].next;
        }
        keys
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    // == List Maintenance ==
    #[cfg(test)]
    fn slot_key(&self, idx: usize) -> Option<&str> {
        if idx == NIL {
            return None;
        }
        self.slots[idx].entry.as_ref().map(|entry| entry.key.as_str())
    }

    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        let slot = Slot {
            entry: Some(entry),
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head == NIL {
            self.tail = idx;
        } else {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.slots[idx].prev;
        let next = self.slots[idx].next;

        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }

        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != idx {
            self.unlink(idx);
            self.push_front(idx);
        }
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
