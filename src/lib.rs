//! fetchgate is a minimal HTTP forwarding gateway.
//!
//! It accepts `GET /proxy?url=<target>`, fetches the target (optionally
//! through a forward proxy), and relays the upstream status, headers and
//! body back to the caller. The number of outbound fetches in flight is
//! bounded by an admission gate, independent of inbound concurrency. In
//! production mode every request must carry a static bearer token.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- Validated runtime [`Settings`](config::Settings).
//! - [`error`] -- Error types using `thiserror` and the JSON error body.
//! - [`gate`] -- The [`AdmissionGate`](gate::AdmissionGate) counting semaphore.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- Production-mode bearer-token guard.
//! - [`relay`] -- `GET /proxy`: upstream clients, header copying, and the
//!   relay handler.
//! - [`server`] -- Axum router, shared application state, and graceful
//!   shutdown.

// Binary crate; public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod gate;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod relay;
pub mod server;
