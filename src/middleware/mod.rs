//! Axum middleware layers.
//!
//! [`auth`] holds the production-mode bearer-token guard.

pub mod auth;
