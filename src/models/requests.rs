//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string of the frontend lookup (GET /api?key=...)
///
/// # Fields
/// - `key`: The key to look up in the served group
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiQuery {
    /// The cache key, empty when absent
    #[serde(default)]
    pub key: String,
}
