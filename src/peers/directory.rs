//! Peer Directory
//!
//! Resolves a key to the transport of the node that owns it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::peers::{HashRing, HttpPeer, PeerFetcher, PeerPicker};

/// Builds the fetcher for one member address.
type Connector = Box<dyn Fn(&str) -> Arc<dyn PeerFetcher> + Send + Sync>;

// == Routing Table ==
/// Ring and fetchers are replaced together so they never disagree.
struct Routing {
    ring: HashRing,
    fetchers: HashMap<String, Arc<dyn PeerFetcher>>,
}

// == Peer Directory ==
/// Membership view of the cluster from one node.
///
/// A key owned by this node resolves to None, telling the caller to load
/// it locally.
pub struct PeerDirectory {
    /// This node's own member address
    self_addr: String,
    /// Virtual nodes per member
    replicas: usize,
    connector: Connector,
    routing: Mutex<Routing>,
}

impl PeerDirectory {
    // == Constructor ==
    /// Creates a directory with no members, using `connector` to build a
    /// fetcher for each member on `set_members`.
    pub fn new<F>(self_addr: impl Into<String>, replicas: usize, connector: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn PeerFetcher> + Send + Sync + 'static,
    {
        Self {
            self_addr: self_addr.into(),
            replicas,
            connector: Box::new(connector),
            routing: Mutex::new(Routing {
                ring: HashRing::new(replicas),
                fetchers: HashMap::new(),
            }),
        }
    }

    /// Creates a directory whose members are reached over HTTP under `base_path`.
    pub fn http(
        self_addr: impl Into<String>,
        replicas: usize,
        base_path: &str,
        timeout: Duration,
    ) -> Result<Self> {
        // peers are addressed directly, never through a system proxy
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("building peer client: {}", e)))?;
        let base_path = base_path.to_string();

        Ok(Self::new(self_addr, replicas, move |addr: &str| {
            Arc::new(HttpPeer::new(client.clone(), addr, &base_path)) as Arc<dyn PeerFetcher>
        }))
    }

    // == Set Members ==
    /// Replaces the whole membership: a fresh ring and one fetcher per member.
    pub async fn set_members<I, S>(&self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members: Vec<String> = members
            .into_iter()
            .map(|member| member.as_ref().to_string())
            .collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&members);
        let fetchers = members
            .iter()
            .map(|member| (member.clone(), (self.connector)(member.as_str())))
            .collect();

        *self.routing.lock().await = Routing { ring, fetchers };
        info!(self_addr = %self.self_addr, members = ?members, "Peer membership updated");
    }

    // == Resolve ==
    /// Returns the fetcher for `key`'s owner, or None if the ring is empty,
    /// this node owns the key, or the owner has no fetcher.
    pub async fn resolve(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let routing = self.routing.lock().await;
        let owner = routing.ring.get(key)?;
        if owner == self.self_addr {
            return None;
        }

        debug!(self_addr = %self.self_addr, peer = owner, key, "Picked peer");
        routing.fetchers.get(owner).cloned()
    }
}

#[async_trait]
impl PeerPicker for PeerDirectory {
    async fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        self.resolve(key).await
    }
}

impl fmt::Debug for PeerDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerDirectory")
            .field("self_addr", &self.self_addr)
            .field("replicas", &self.replicas)
            .finish()
    }
}
