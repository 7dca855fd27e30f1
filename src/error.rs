//! Error types for fetchgate.
//!
//! [`GatewayError`] covers startup and CLI failures, [`FetchError`] covers
//! everything that can go wrong talking to an upstream. Upstream failures
//! are logged in full but only ever reach the caller as the opaque body
//! produced by [`json_error`].

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("ACCESS_KEY environment variable is required in production")]
    MissingAccessKey,

    #[error("Invalid forward proxy URL '{url}': {reason}")]
    InvalidProxyUrl { url: String, reason: String },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build upstream request: {0}")]
    Build(#[from] http::Error),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream body: {0}")]
    Body(#[from] hyper::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// `{"error": "<message>"}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}
