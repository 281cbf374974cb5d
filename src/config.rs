//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::time::Duration;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This node's own base URL, as it appears in `peers`
    pub node_addr: String,
    /// Base URLs of every cluster member, this node included
    pub peers: Vec<String>,
    /// Port of the peer-facing cache server
    pub server_port: u16,
    /// Port of the frontend API server, disabled when None
    pub api_port: Option<u16>,
    /// Byte budget of the served group's local cache
    pub cache_bytes: u64,
    /// Virtual nodes per member on the hash ring
    pub replicas: usize,
    /// Path prefix of the peer endpoint
    pub base_path: String,
    /// Name of the group this node serves
    pub group_name: String,
    /// Timeout for a single peer fetch in milliseconds
    pub peer_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NODE_ADDR` - This node's base URL (default: http://localhost:8001)
    /// - `PEERS` - Comma-separated member base URLs (default: three local nodes 8001-8003)
    /// - `SERVER_PORT` - Cache server port (default: 8001)
    /// - `API_PORT` - Frontend API port (default: unset, no frontend)
    /// - `CACHE_BYTES` - Group cache budget in bytes (default: 2048)
    /// - `REPLICAS` - Virtual nodes per member (default: 32)
    /// - `BASE_PATH` - Peer endpoint prefix (default: /_groupcache)
    /// - `GROUP_NAME` - Served group (default: scores)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            node_addr: env::var("NODE_ADDR")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.node_addr),
            peers: env::var("PEERS")
                .ok()
                .map(|v| parse_peer_list(&v))
                .filter(|peers| !peers.is_empty())
                .unwrap_or(defaults.peers),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            api_port: env::var("API_PORT").ok().and_then(|v| v.parse().ok()),
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            replicas: env::var("REPLICAS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.replicas),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            peer_timeout_ms: env::var("PEER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.peer_timeout_ms),
        }
    }

    /// Peer fetch timeout as a Duration.
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}

/// Splits a comma-separated member list, dropping blanks and trailing slashes.
pub fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|peer| peer.trim().trim_end_matches('/'))
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_addr: "http://localhost:8001".to_string(),
            peers: vec![
                "http://localhost:8001".to_string(),
                "http://localhost:8002".to_string(),
                "http://localhost:8003".to_string(),
            ],
            server_port: 8001,
            api_port: None,
            cache_bytes: 2 << 10,
            replicas: 32,
            base_path: "/_groupcache".to_string(),
            group_name: "scores".to_string(),
            peer_timeout_ms: 2000,
        }
    }
}
