//! API Module
//!
//! HTTP handlers and routing for the cache node.
//!
//! # Endpoints
//! - `GET <base_path>/:group/*key` - Peer protocol: raw value bytes
//! - `GET /api?key=...` - Frontend lookup in the served group
//! - `GET /stats/:group` - Group statistics
//! - `GET /health` - Liveness and served groups

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_api_router, create_router};
