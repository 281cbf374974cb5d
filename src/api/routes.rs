//! API Routes
//!
//! Configures the Axum routers for the peer-facing cache server and the
//! frontend API server.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_handler, health_handler, peer_handler, peer_root_handler, stats_handler, AppState,
};

/// Normalises a base path to `/segment` form; empty for the root.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Creates the router served to peers.
///
/// # Endpoints
/// - `GET <base_path>/:group/*key` - Raw value bytes for a group's key
/// - `GET <base_path>` and `<base_path>/` - Always 400
/// - `GET /stats/:group` - Group statistics
/// - `GET /health` - Liveness plus the groups served here
///
/// Every request is traced through tower-http.
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let base = normalize_base_path(base_path);
    let mut router = Router::new()
        .route(&format!("{}/", base), get(peer_root_handler))
        .route(&format!("{}/*path", base), get(peer_handler));
    // the wildcard never matches an empty remainder
    if !base.is_empty() {
        router = router.route(&base, get(peer_root_handler));
    }

    router
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the frontend router.
///
/// # Endpoints
/// - `GET /api?key=...` - Value for a key of the served group
/// - `GET /health` - Liveness plus the groups served here
///
/// Browsers on any origin may call it; requests are traced.
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GroupRegistry, LoaderFn};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn test_state() -> AppState {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .new_group(
                "scores",
                2 << 10,
                LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec())),
            )
            .await
            .unwrap();
        AppState::new(registry, "scores")
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/_groupcache/"), "/_groupcache");
        assert_eq!(normalize_base_path("_groupcache"), "/_groupcache");
        assert_eq!(normalize_base_path("/"), "");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state().await, "/_groupcache");
        assert_eq!(status_of(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_peer_endpoint() {
        let app = create_router(test_state().await, "/_groupcache");
        assert_eq!(status_of(app, "/_groupcache/scores/Tom").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let app = create_router(test_state().await, "/cache/");
        assert_eq!(status_of(app, "/cache/scores/Tom").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_unknown_group() {
        let app = create_router(test_state().await, "/_groupcache");
        assert_eq!(status_of(app, "/stats/nope").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_endpoint() {
        let app = create_api_router(test_state().await);
        assert_eq!(status_of(app, "/api?key=Tom").await, StatusCode::OK);
    }
}
