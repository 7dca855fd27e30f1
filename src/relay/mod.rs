//! `GET /proxy`: relay one request to one upstream URL.
//!
//! [`relay_handler`] validates the query, takes a permit from the
//! [`AdmissionGate`](crate::gate::AdmissionGate), fetches the target
//! (through the forward proxy unless `proxy=false`), and answers with the
//! upstream status, headers and buffered body. The permit lives for the
//! fetch and the response construction and is dropped on every exit path.
//! Upstream failures are logged and reported as an opaque 500.

pub mod client;
pub mod headers;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use crate::error::{json_error, FetchError};
use crate::server::AppState;

use client::FetchedResponse;

pub const MISSING_URL: &str = "URL parameter is required";
pub const FETCH_FAILED: &str = "Failed to fetch URL";
pub const GATE_REJECTED: &str = "Too many pending requests";

#[derive(Debug, Default)]
pub struct RelayParams {
    pub url: Option<String>,
    pub proxy: Option<String>,
}

impl RelayParams {
    /// Decode `url` and `proxy` from a raw query string. A repeated key
    /// keeps its first value; unknown keys are ignored.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "url" => &mut params.url,
                "proxy" => &mut params.proxy,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }

    /// The target, unless absent or empty.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Only the literal `proxy=false` skips the forward proxy.
    #[must_use]
    pub fn bypasses_proxy(&self) -> bool {
        self.proxy.as_deref() == Some("false")
    }
}

pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    req_headers: HeaderMap,
) -> Response {
    let params = RelayParams::from_query(query.as_deref());
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let Some(target) = params.target() else {
        return json_error(StatusCode::BAD_REQUEST, MISSING_URL);
    };
    let bypass_proxy = params.bypasses_proxy();

    let queued_at = Instant::now();
    let permit = match state.gate.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                target = %target,
                error = %e,
                waiting = state.gate.waiting(),
                "admission rejected"
            );
            state.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return json_error(StatusCode::SERVICE_UNAVAILABLE, GATE_REJECTED);
        }
    };

    let via_proxy = state.upstream.has_forward_proxy() && !bypass_proxy;
    tracing::info!(
        correlation_id = %correlation_id,
        target = %target,
        via_proxy,
        wait_ms = u64::try_from(queued_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        "fetch admitted"
    );

    let started = Instant::now();
    let outcome = state
        .upstream
        .fetch(target, bypass_proxy)
        .await
        .and_then(|fetched| relay_response(fetched).map_err(FetchError::from));
    drop(permit);
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(response) => {
            state.stats.relayed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                correlation_id = %correlation_id,
                target = %target,
                status = response.status().as_u16(),
                latency_ms,
                "upstream responded"
            );
            response
        }
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                correlation_id = %correlation_id,
                target = %target,
                via_proxy,
                latency_ms,
                error = %e,
                detail = ?e,
                "proxy error"
            );
            json_error(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        }
    }
}

/// Upstream status, headers and body, as-is.
pub fn relay_response(fetched: FetchedResponse) -> Result<Response, axum::http::Error> {
    let mut response = Response::builder()
        .status(fetched.status)
        .body(Body::from(fetched.body))?;
    headers::copy_response_headers(&fetched.headers, response.headers_mut());
    Ok(response)
}
