//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and the frontend API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::group::{CacheGroup, GroupRegistry};
use crate::models::{ApiQuery, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the process-wide group registry and the group the frontend serves.
#[derive(Clone)]
pub struct AppState {
    /// All groups on this node
    pub registry: Arc<GroupRegistry>,
    /// Group answered by GET /api
    pub api_group: String,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<GroupRegistry>, api_group: impl Into<String>) -> Self {
        Self {
            registry,
            api_group: api_group.into(),
        }
    }

    async fn group(&self, name: &str) -> Result<Arc<CacheGroup>> {
        self.registry
            .get_group(name)
            .await
            .ok_or_else(|| CacheError::GroupNotFound(name.to_string()))
    }
}

/// Raw value bytes as `application/octet-stream`.
fn octet_stream(view: ByteView) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response()
}

/// Handler for GET <base_path>/:group/*key
///
/// Serves a peer's request for a value. The remainder of the path must
/// split into a group name and a key.
pub async fn peer_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response> {
    let (group_name, key) = path.split_once('/').ok_or_else(|| {
        CacheError::BadRequest(format!("expected <group>/<key>, got {}", path))
    })?;
    debug!(group = group_name, key, "Peer request");

    let group = state.group(group_name).await?;
    let view = group
        .get(key)
        .await
        .map_err(|err| CacheError::Internal(err.to_string()))?;

    Ok(octet_stream(view))
}

/// Handler for GET <base_path> and GET <base_path>/
///
/// A request naming neither group nor key is malformed.
pub async fn peer_root_handler() -> Result<Response> {
    Err(CacheError::BadRequest(
        "expected <group>/<key>, got an empty path".to_string(),
    ))
}

/// Handler for GET /api?key=...
///
/// Looks the key up in the frontend's group.
pub async fn api_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response> {
    let group = state.group(&state.api_group).await?;
    let view = group.get(&query.key).await?;

    Ok(octet_stream(view))
}

/// Handler for GET /stats/:group
///
/// Returns the group's counters and cache size.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state.group(&group_name).await?;
    Ok(Json(StatsResponse::new(group_name, group.stats().await)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::up(state.registry.names().await))
}
