//! Integration Tests for the HTTP surface
//!
//! Drives the peer and frontend routers end to end, then runs two real
//! nodes on ephemeral ports talking to each other over HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mini_groupcache::api::{create_api_router, create_router};
use mini_groupcache::group::ValueSource;
use mini_groupcache::peers::PeerFetcher;
use mini_groupcache::{AppState, CacheGroup, GroupRegistry, LoaderFn, PeerDirectory};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

const BASE_PATH: &str = "/_groupcache";

// == Helper Functions ==

async fn scores_state() -> AppState {
    let registry = Arc::new(GroupRegistry::new());
    registry
        .new_group(
            "scores",
            2 << 10,
            LoaderFn::new(|key: &str| -> anyhow::Result<Vec<u8>> {
                match key {
                    "Tom" => Ok(b"630".to_vec()),
                    "Jack" => Ok(b"589".to_vec()),
                    "Sam" => Ok(b"567".to_vec()),
                    _ => anyhow::bail!("{} not exist", key),
                }
            }),
        )
        .await
        .unwrap();
    AppState::new(registry, "scores")
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, bytes.to_vec())
}

// == Peer Endpoint Tests ==

#[tokio::test]
async fn test_peer_endpoint_returns_raw_bytes() {
    let app = create_router(scores_state().await, BASE_PATH);

    let (status, content_type, body) = get(app, "/_groupcache/scores/Tom").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(body, b"630");
}

#[tokio::test]
async fn test_peer_endpoint_single_segment_is_bad_request() {
    let app = create_router(scores_state().await, BASE_PATH);

    let (status, _, _) = get(app, "/_groupcache/scores").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_peer_endpoint_without_group_is_bad_request() {
    let app = create_router(scores_state().await, BASE_PATH);

    for uri in ["/_groupcache/", "/_groupcache"] {
        let (status, _, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 400);
    }
}

#[tokio::test]
async fn test_peer_endpoint_unknown_group_is_not_found() {
    let app = create_router(scores_state().await, BASE_PATH);

    let (status, _, body) = get(app, "/_groupcache/players/Tom").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("players"));
}

#[tokio::test]
async fn test_peer_endpoint_load_failure_is_server_error() {
    let app = create_router(scores_state().await, BASE_PATH);

    let (status, _, body) = get(app, "/_groupcache/scores/Unknown").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Unknown not exist"));
}

#[tokio::test]
async fn test_peer_endpoint_empty_key_is_server_error() {
    let app = create_router(scores_state().await, BASE_PATH);

    let (status, _, _) = get(app, "/_groupcache/scores/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_peer_endpoint_decodes_escaped_key() {
    let state = scores_state().await;
    state
        .registry
        .new_group(
            "echo",
            0,
            LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec())),
        )
        .await
        .unwrap();
    let app = create_router(state, BASE_PATH);

    let (status, _, body) = get(app, "/_groupcache/echo/a%20b%2Fc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"a b/c");
}

// == Frontend Tests ==

#[tokio::test]
async fn test_api_endpoint() {
    let state = scores_state().await;
    let app = create_api_router(state);

    let (status, content_type, body) = get(app.clone(), "/api?key=Jack").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(body, b"589");

    let (status, _, _) = get(app.clone(), "/api").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(app, "/api?key=Nobody").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// == Stats Tests ==

#[tokio::test]
async fn test_stats_after_hits_and_misses() {
    let app = create_router(scores_state().await, BASE_PATH);

    get(app.clone(), "/_groupcache/scores/Tom").await;
    get(app.clone(), "/_groupcache/scores/Tom").await;
    get(app.clone(), "/_groupcache/scores/Unknown").await;

    let (status, _, body) = get(app, "/stats/scores").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["group"], "scores");
    assert_eq!(json["gets"], 3);
    assert_eq!(json["cache_hits"], 1);
    assert_eq!(json["local_loads"], 1);
    assert_eq!(json["local_load_errs"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["used_bytes"], 6);
}

// == Two Node Tests ==

struct Node {
    addr: String,
    group: Arc<CacheGroup>,
    directory: Arc<PeerDirectory>,
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    (listener, addr)
}

/// Starts a node whose loader tags values with `tag`.
async fn start_node(listener: TcpListener, addr: &str, tag: &'static str, members: &[String]) -> Node {
    let registry = Arc::new(GroupRegistry::new());
    let group = registry
        .new_group(
            "scores",
            2 << 10,
            LoaderFn::new(move |key: &str| -> anyhow::Result<Vec<u8>> {
                Ok(format!("{}:{}", tag, key).into_bytes())
            }),
        )
        .await
        .unwrap();

    let directory =
        Arc::new(PeerDirectory::http(addr, 32, BASE_PATH, Duration::from_secs(2)).unwrap());
    directory.set_members(members).await;
    group.register_peers(directory.clone()).unwrap();

    let app = create_router(AppState::new(registry, "scores"), BASE_PATH);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Node {
        addr: addr.to_string(),
        group,
        directory,
    }
}

/// Finds a key with `prefix` that `directory` routes to `owner`.
async fn key_owned_by(directory: &PeerDirectory, owner: &str, prefix: &str) -> String {
    for i in 0..10_000 {
        let key = format!("{}{}", prefix, i);
        if let Some(peer) = directory.resolve(&key).await {
            if peer.addr() == owner {
                return key;
            }
        }
    }
    panic!("no key routed to {}", owner);
}

#[tokio::test]
async fn test_two_nodes_route_to_owner() {
    let (listener1, addr1) = bind().await;
    let (listener2, addr2) = bind().await;
    let members = vec![addr1.clone(), addr2.clone()];

    let node1 = start_node(listener1, &addr1, "node1", &members).await;
    let node2 = start_node(listener2, &addr2, "node2", &members).await;

    // a key node2 owns is loaded by node2, and only node2 caches it
    let key = key_owned_by(&node1.directory, &node2.addr, "key-").await;
    let (view, source) = node1.group.get_with_source(&key).await.unwrap();
    assert_eq!(view.to_string(), format!("node2:{}", key));
    assert_eq!(source, ValueSource::Peer);
    assert_eq!(node1.group.stats().await.total_entries, 0);
    assert_eq!(node2.group.stats().await.total_entries, 1);

    // keys node1 owns never leave node1
    let local_key = key_owned_by(&node2.directory, &node1.addr, "key-").await;
    let (view, source) = node1.group.get_with_source(&local_key).await.unwrap();
    assert_eq!(view.to_string(), format!("node1:{}", local_key));
    assert_eq!(source, ValueSource::Loader);
}

#[tokio::test]
async fn test_two_nodes_escape_keys_on_the_wire() {
    let (listener1, addr1) = bind().await;
    let (listener2, addr2) = bind().await;
    let members = vec![addr1.clone(), addr2.clone()];

    let node1 = start_node(listener1, &addr1, "node1", &members).await;
    let node2 = start_node(listener2, &addr2, "node2", &members).await;

    let key = key_owned_by(&node1.directory, &node2.addr, "a b/?").await;
    let view = node1.group.get(&key).await.unwrap();
    assert_eq!(view.to_string(), format!("node2:{}", key));
}

#[tokio::test]
async fn test_dead_owner_falls_back_to_local_loader() {
    let (listener1, addr1) = bind().await;
    // reserve an address, then close it so connections are refused
    let (dead_listener, dead_addr) = bind().await;
    drop(dead_listener);
    let members = vec![addr1.clone(), dead_addr.clone()];

    let node1 = start_node(listener1, &addr1, "node1", &members).await;

    let key = key_owned_by(&node1.directory, &dead_addr, "key-").await;
    let (view, source) = node1.group.get_with_source(&key).await.unwrap();
    assert_eq!(view.to_string(), format!("node1:{}", key));
    assert_eq!(source, ValueSource::Loader);

    let stats = node1.group.stats().await;
    assert_eq!(stats.peer_errors, 1);
    assert_eq!(stats.local_loads, 1);
    assert_eq!(stats.total_entries, 1);

    // now cached, the dead peer is not consulted again
    let (_, source) = node1.group.get_with_source(&key).await.unwrap();
    assert_eq!(source, ValueSource::Cache);
    assert_eq!(node1.group.stats().await.peer_errors, 1);
}
