//! Static bearer-token check for production mode.
//!
//! When [`AppState::access_key`](crate::server::AppState) is set, every
//! guarded request must carry `Authorization: Bearer <token>` with the
//! configured token. In development mode the key is `None` and requests
//! pass straight through.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::error::json_error;
use crate::server::AppState;

pub const MISSING_BEARER: &str = "Authorization header with Bearer token is required";
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Extract the token from an `Authorization` header value.
///
/// The value must start with `Bearer `; the token is the first
/// space-separated word after it and may be empty.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(|rest| rest.split(' ').next().unwrap_or_default())
}

/// Compare digests so timing does not depend on where the tokens differ.
#[must_use]
pub fn token_matches(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

pub async fn bearer_auth_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.access_key.as_deref() else {
        return next.run(request).await;
    };

    let verdict = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        None => Err(MISSING_BEARER),
        Some(token) if !token_matches(token, expected) => Err(UNAUTHORIZED),
        Some(_) => Ok(()),
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(message) => {
            tracing::debug!(path = %request.uri().path(), reason = message, "request rejected");
            json_error(StatusCode::UNAUTHORIZED, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_word_after_scheme() {
        assert_eq!(bearer_token("Bearer secret"), Some("secret"));
        assert_eq!(bearer_token("Bearer secret trailing"), Some("secret"));
        assert_eq!(bearer_token("Bearer "), Some(""));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("bearer secret"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn token_comparison() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("wrong", "secret"));
        assert!(!token_matches("", "secret"));
        assert!(!token_matches("secret ", "secret"));
    }
}
