//! Main Cache Module
//!
//! Concurrency-safe wrapper around the byte-budgeted LRU used by each group.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{ByteView, EvictionObserver, GroupCounters, LruCache};

// == Eviction Tally ==
/// Counts evictions into the owning group's statistics.
struct EvictionTally(Arc<GroupCounters>);

impl EvictionObserver<ByteView> for EvictionTally {
    fn on_evict(&self, key: &str, value: &ByteView) {
        self.0.record_eviction();
        debug!(key, bytes = value.len(), "Evicted cache entry");
    }
}

// == Main Cache ==
/// A group's local cache.
///
/// Every operation holds the mutex for the whole structural update,
/// including the eviction loop, and never across an await on I/O.
/// The LRU itself is built on first insertion.
#[derive(Debug)]
pub struct MainCache {
    /// Byte budget handed to the LRU, 0 = unbounded
    cache_bytes: u64,
    /// Shared with the owning group
    counters: Arc<GroupCounters>,
    lru: Mutex<Option<LruCache<ByteView>>>,
}

impl MainCache {
    // == Constructor ==
    pub fn new(cache_bytes: u64, counters: Arc<GroupCounters>) -> Self {
        Self {
            cache_bytes,
            counters,
            lru: Mutex::new(None),
        }
    }

    // == Add ==
    /// Stores `value` under `key`, evicting older entries if over budget.
    pub async fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.lru.lock().await;
        let lru = guard.get_or_insert_with(|| {
            LruCache::with_observer(self.cache_bytes, EvictionTally(self.counters.clone()))
        });
        lru.add(key, value);
    }

    // == Get ==
    /// Looks up `key`, promoting it on a hit.
    pub async fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock().await;
        guard.as_mut()?.get(key).cloned()
    }

    // == Remove Oldest ==
    /// Drops the least recently used entry, returning its key.
    pub async fn remove_oldest(&self) -> Option<String> {
        let mut guard = self.lru.lock().await;
        guard.as_mut()?.remove_oldest().map(|(key, _)| key)
    }

    // == Size ==
    /// Returns (entries, used bytes) under a single lock acquisition.
    pub async fn size(&self) -> (usize, u64) {
        let guard = self.lru.lock().await;
        guard
            .as_ref()
            .map_or((0, 0), |lru| (lru.len(), lru.used_bytes()))
    }

    /// The configured byte budget.
    pub fn cache_bytes(&self) -> u64 {
        self.cache_bytes
    }
}
