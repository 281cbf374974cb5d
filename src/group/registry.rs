//! Group Registry Module
//!
//! Owns every group in the process, keyed by name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{CacheGroup, Loader};

// == Group Registry ==
/// Name to group map, created at startup and shared by reference.
///
/// Registration takes the write lock and lookups the read lock; neither is
/// held while a group serves a request.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<CacheGroup>>>,
}

impl GroupRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group.
    ///
    /// Fails with `DuplicateGroup` if the name is taken; groups are never
    /// replaced or removed.
    pub async fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        loader: impl Loader + 'static,
    ) -> Result<Arc<CacheGroup>> {
        let name = name.into();
        let mut groups = self.groups.write().await;
        if groups.contains_key(&name) {
            return Err(CacheError::DuplicateGroup(name));
        }

        let group = Arc::new(CacheGroup::new(name.clone(), cache_bytes, Arc::new(loader)));
        groups.insert(name.clone(), group.clone());
        info!(group = %name, cache_bytes, "Group registered");

        Ok(group)
    }

    // == Get Group ==
    /// Looks up a group by name.
    pub async fn get_group(&self, name: &str) -> Option<Arc<CacheGroup>> {
        self.groups.read().await.get(name).cloned()
    }

    /// Names of all registered groups, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
