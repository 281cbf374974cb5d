//! Cache Module
//!
//! Provides the byte-budgeted LRU, the immutable value view and the
//! per-group local cache built from them.

mod entry;
mod lru;
mod stats;
mod store;
mod view;


// Re-export public types
pub use entry::{CacheEntry, SizedValue};
pub use lru::{EvictionObserver, LruCache};
pub use stats::{CacheStats, GroupCounters};
pub use store::MainCache;
pub use view::ByteView;
