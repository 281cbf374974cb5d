//! Mini Groupcache - A distributed read-through cache
//!
//! Each node keeps a byte-budgeted LRU cache per group. On a miss, the key
//! is fetched from the peer that owns it on a consistent-hash ring, or
//! loaded from the application's source when this node owns it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{CacheGroup, GroupRegistry, Loader, LoaderFn};
pub use peers::PeerDirectory;
