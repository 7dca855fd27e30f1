//! Copying upstream response headers onto the relayed response.
//!
//! Every end-to-end header is copied in upstream iteration order with
//! `insert` semantics, so when a name repeats the last value wins.
//! Connection-level headers and `content-length` are left out: the body
//! has been buffered and the gateway's own server frames it again.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName};
use hyper::header::CONTENT_LENGTH;

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

fn is_framing(name: &HeaderName) -> bool {
    name == CONTENT_LENGTH || HOP_BY_HOP.contains(name)
}

/// Copy `upstream` into `target`, last value per name wins.
pub fn copy_response_headers(upstream: &HeaderMap, target: &mut HeaderMap) {
    for (name, value) in upstream {
        if is_framing(name) {
            continue;
        }
        target.insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn duplicate_names_keep_last_value() {
        let mut upstream = HeaderMap::new();
        upstream.append("set-cookie", HeaderValue::from_static("a=1"));
        upstream.append("set-cookie", HeaderValue::from_static("b=2"));

        let mut out = HeaderMap::new();
        copy_response_headers(&upstream, &mut out);

        let values: Vec<_> = out.get_all("set-cookie").iter().collect();
        assert_eq!(values, vec![HeaderValue::from_static("b=2")]);
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut upstream = HeaderMap::new();
        upstream.insert("X-Upstream", HeaderValue::from_static("yes"));

        let mut out = HeaderMap::new();
        copy_response_headers(&upstream, &mut out);

        assert_eq!(out.get("x-upstream").unwrap(), "yes");
    }

    #[test]
    fn end_to_end_headers_survive() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-type", HeaderValue::from_static("text/plain"));
        upstream.insert("content-encoding", HeaderValue::from_static("gzip"));
        upstream.insert("cache-control", HeaderValue::from_static("no-store"));

        let mut out = HeaderMap::new();
        copy_response_headers(&upstream, &mut out);

        assert_eq!(out.len(), 3);
        assert_eq!(out.get("content-encoding").unwrap(), "gzip");
    }

    #[test]
    fn framing_headers_are_dropped() {
        let mut upstream = HeaderMap::new();
        upstream.insert("connection", HeaderValue::from_static("keep-alive"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("content-length", HeaderValue::from_static("12"));
        upstream.insert("content-type", HeaderValue::from_static("text/html"));

        let mut out = HeaderMap::new();
        copy_response_headers(&upstream, &mut out);

        assert!(out.get("connection").is_none());
        assert!(out.get("transfer-encoding").is_none());
        assert!(out.get("content-length").is_none());
        assert_eq!(out.get("content-type").unwrap(), "text/html");
    }
}
