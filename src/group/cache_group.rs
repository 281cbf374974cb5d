//! Cache Group Module
//!
//! A named cache namespace coordinating local cache, peers and loader.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, GroupCounters, MainCache};
use crate::error::{CacheError, Result};
use crate::group::Loader;
use crate::peers::{PeerFetcher, PeerPicker};

// == Value Source ==
/// Where a value returned by [`CacheGroup::get_with_source`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Served from this node's cache
    Cache,
    /// Fetched from the owning peer
    Peer,
    /// Produced by this node's loader
    Loader,
}

// == Cache Group ==
/// A named cache with its own loader and byte budget.
///
/// A miss is routed to the peer owning the key when one is registered.
/// Peer failures fall back to the local loader. Only values produced by
/// the local loader are cached here; values fetched from a peer are left
/// to the owning node.
pub struct CacheGroup {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: MainCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    counters: Arc<GroupCounters>,
}

impl CacheGroup {
    // == Constructor ==
    /// Creates an unregistered group. Most callers want
    /// [`GroupRegistry::new_group`](crate::group::GroupRegistry::new_group).
    pub fn new(name: impl Into<String>, cache_bytes: u64, loader: Arc<dyn Loader>) -> Self {
        let counters = Arc::new(GroupCounters::new());
        Self {
            name: name.into(),
            loader,
            main_cache: MainCache::new(cache_bytes, counters.clone()),
            peers: OnceLock::new(),
            counters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used to route misses. Allowed once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers
            .set(peers)
            .map_err(|_| CacheError::PeersAlreadyRegistered(self.name.clone()))
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// Fails with `InvalidArgument` for an empty key and `SourceUnavailable`
    /// when the value has to be loaded locally and the loader fails.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        self.get_with_source(key).await.map(|(view, _)| view)
    }

    /// Like [`get`](Self::get), also reporting where the value came from.
    pub async fn get_with_source(&self, key: &str) -> Result<(ByteView, ValueSource)> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }
        self.counters.record_get();

        if let Some(view) = self.main_cache.get(key).await {
            self.counters.record_hit();
            debug!(group = %self.name, key, "Cache hit");
            return Ok((view, ValueSource::Cache));
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<(ByteView, ValueSource)> {
        self.counters.record_load();

        if let Some(picker) = self.peers.get() {
            if let Some(peer) = picker.pick_peer(key).await {
                match self.get_from_peer(peer.as_ref(), key).await {
                    Ok(view) => {
                        self.counters.record_peer_load();
                        return Ok((view, ValueSource::Peer));
                    }
                    Err(err) => {
                        self.counters.record_peer_error();
                        warn!(
                            group = %self.name,
                            peer = peer.addr(),
                            key,
                            error = %err,
                            "Peer fetch failed, loading locally"
                        );
                    }
                }
            }
        }

        let view = self.get_locally(key).await?;
        Ok((view, ValueSource::Loader))
    }

    async fn get_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        debug!(group = %self.name, key, "Loading from source");

        let bytes = match self.loader.load(key).await {
            Ok(bytes) => bytes,
            Err(source) => {
                self.counters.record_local_load_err();
                return Err(CacheError::source_unavailable(key, source));
            }
        };
        self.counters.record_local_load();

        let view = ByteView::from(bytes);
        self.populate_cache(key, view.clone()).await;
        Ok(view)
    }

    async fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value).await;
    }

    // == Stats ==
    /// Snapshot of this group's counters and cache size.
    pub async fn stats(&self) -> CacheStats {
        let (entries, used_bytes) = self.main_cache.size().await;
        self.counters.snapshot(entries, used_bytes)
    }

    /// The local cache's byte budget, 0 = unbounded.
    pub fn cache_bytes(&self) -> u64 {
        self.main_cache.cache_bytes()
    }
}

impl fmt::Debug for CacheGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGroup")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
