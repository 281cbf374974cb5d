//! Group Module
//!
//! Named cache groups, their loaders and the registry that owns them.
//!
//! A `get` on a group walks: local cache -> owning peer -> local loader,
//! caching only what the local loader produced.

mod cache_group;
mod loader;
mod registry;

pub use cache_group::{CacheGroup, ValueSource};
pub use loader::{Loader, LoaderFn};
pub use registry::GroupRegistry;
