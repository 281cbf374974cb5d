//! Peers Module
//!
//! Consistent-hash routing of keys to the node that owns them, and the
//! transport used to fetch values from that node.
//!
//! # Components
//! - `HashRing` - virtual-node ring mapping keys to member addresses
//! - `PeerDirectory` - ring plus one fetcher per member, excluding this node
//! - `HttpPeer` - fetcher speaking the peer HTTP protocol

mod client;
mod directory;
mod ring;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{HttpPeer, MAX_PEER_BODY_BYTES, PEER_PATH_ENCODE_SET};
pub use directory::PeerDirectory;
pub use ring::{crc32_ieee, HashFn, HashRing};

// == Peer Fetcher ==
/// Fetches a group's value from one remote node.
#[async_trait]
pub trait PeerFetcher: Send + Sync {
    /// Returns the raw value bytes, or `PeerUnavailable` on any failure.
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;

    /// The member address this fetcher talks to.
    fn addr(&self) -> &str;
}

// == Peer Picker ==
/// Chooses the remote node responsible for a key.
#[async_trait]
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer's fetcher, or None when this node should
    /// load the key itself.
    async fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}
