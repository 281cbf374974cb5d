//! HTTP Peer Client
//!
//! Fetches values from a remote node with `GET <peer><base_path>/<group>/<key>`.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::PeerFetcher;

/// Characters escaped in the group and key path segments (all but RFC 3986 unreserved).
pub const PEER_PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Largest value body accepted from a peer.
pub const MAX_PEER_BODY_BYTES: u64 = 64 << 20;

// == HTTP Peer ==
/// Peer fetcher over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPeer {
    /// Member address, e.g. `http://localhost:8002`
    addr: String,
    /// Address joined with the base path, always ending in `/`
    base_url: String,
    client: reqwest::Client,
    /// Responses longer than this are rejected
    max_body_bytes: u64,
}

impl HttpPeer {
    // == Constructor ==
    /// Creates a fetcher for `addr`, sharing `client`'s connection pool.
    pub fn new(client: reqwest::Client, addr: &str, base_path: &str) -> Self {
        let base_path = base_path.trim_matches('/');
        let base_url = if base_path.is_empty() {
            format!("{}/", addr.trim_end_matches('/'))
        } else {
            format!("{}/{}/", addr.trim_end_matches('/'), base_path)
        };

        Self {
            addr: addr.to_string(),
            base_url,
            client,
            max_body_bytes: MAX_PEER_BODY_BYTES,
        }
    }

    /// Overrides the response size limit.
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Builds the request URL for `group` and `key`.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            utf8_percent_encode(group, PEER_PATH_ENCODE_SET),
            utf8_percent_encode(key, PEER_PATH_ENCODE_SET)
        )
    }
}

#[async_trait]
impl PeerFetcher for HttpPeer {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key);
        debug!(%url, "Fetching from peer");

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::PeerUnavailable(format!("{}: {}", url, e)))?;

        if response.status() != StatusCode::OK {
            return Err(CacheError::PeerUnavailable(format!(
                "{}: server returned {}",
                url,
                response.status()
            )));
        }

        let too_large = |len: u64| {
            CacheError::PeerUnavailable(format!(
                "{}: response of {} bytes exceeds limit of {}",
                url, len, self.max_body_bytes
            ))
        };
        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes {
                return Err(too_large(len));
            }
        }

        // content-length may be absent, so the limit is enforced while reading too
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            CacheError::PeerUnavailable(format!("{}: reading response body: {}", url, e))
        })? {
            let len = (body.len() + chunk.len()) as u64;
            if len > self.max_body_bytes {
                return Err(too_large(len));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn addr(&self) -> &str {
        &self.addr
    }
}
