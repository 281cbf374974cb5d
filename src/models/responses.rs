//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for GET /stats/:group
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group the counters belong to
    pub group: String,
    /// Counters and cache size
    #[serde(flatten)]
    pub stats: CacheStats,
    /// cache_hits / gets
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse, computing the hit rate
    pub fn new(group: impl Into<String>, stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            group: group.into(),
            stats,
            hit_rate,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Groups this node can answer for, sorted by name
    pub groups: Vec<String>,
    /// RFC 3339 time the probe was answered
    pub checked_at: String,
}

impl HealthResponse {
    pub fn up(groups: Vec<String>) -> Self {
        Self {
            status: "up",
            groups,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// JSON body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Numeric HTTP status, repeated for clients that only read the body
    pub code: u16,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: u16, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }
}
