//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the HTTP surface.
///
/// Callers of [`CacheGroup::get`](crate::group::CacheGroup::get) only ever
/// observe `InvalidArgument` or `SourceUnavailable`; peer failures are
/// absorbed by the local-load fallback.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty or malformed key
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The application loader failed to produce a value
    #[error("Source unavailable for key {key}: {source}")]
    SourceUnavailable {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A remote peer could not serve the request
    #[error("Peer unavailable: {0}")]
    PeerUnavailable(String),

    /// A group with this name is already registered
    #[error("Duplicate group: {0}")]
    DuplicateGroup(String),

    /// Peers were already registered on this group
    #[error("Peers already registered for group: {0}")]
    PeersAlreadyRegistered(String),

    /// No group registered under this name
    #[error("No such group: {0}")]
    GroupNotFound(String),

    /// Malformed HTTP request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a loader failure for `key`.
    pub fn source_unavailable(key: impl Into<String>, source: anyhow::Error) -> Self {
        CacheError::SourceUnavailable {
            key: key.into(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_) | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::DuplicateGroup(_) | CacheError::PeersAlreadyRegistered(_) => {
                StatusCode::CONFLICT
            }
            CacheError::SourceUnavailable { .. }
            | CacheError::PeerUnavailable(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(status.as_u16(), self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_unavailable_keeps_loader_error() {
        let err = CacheError::source_unavailable("Tom", anyhow::anyhow!("db offline"));

        assert!(err.to_string().contains("Tom"));
        assert!(err.to_string().contains("db offline"));
        assert_eq!(err.source().unwrap().to_string(), "db offline");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::InvalidArgument("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::BadRequest("p".into()), StatusCode::BAD_REQUEST),
            (CacheError::GroupNotFound("g".into()), StatusCode::NOT_FOUND),
            (CacheError::DuplicateGroup("g".into()), StatusCode::CONFLICT),
            (
                CacheError::PeerUnavailable("p".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CacheError::source_unavailable("k", anyhow::anyhow!("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
