//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the admission
//! gate, the upstream client, the access key and stats), [`build_router`]
//! for constructing the Axum router with its middleware layers, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{RunMode, Settings};
use crate::error::GatewayError;
use crate::gate::AdmissionGate;
use crate::health::health_handler;
use crate::middleware::auth::bearer_auth_guard;
use crate::relay::client::UpstreamClient;
use crate::relay::relay_handler;

#[derive(Debug)]
pub struct Stats {
    pub relayed: AtomicU64,
    pub failed: AtomicU64,
    pub rejected: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            relayed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }
}

pub struct AppState {
    pub gate: AdmissionGate,
    pub upstream: UpstreamClient,
    /// Token enforced by the auth guard; `None` disables the check.
    pub access_key: Option<String>,
    pub mode: RunMode,
    pub start_time: Instant,
    pub stats: Stats,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        Ok(Self {
            gate: AdmissionGate::with_limits(settings.max_connections, settings.gate_limits),
            upstream: UpstreamClient::new(
                settings.forward_proxy.as_ref(),
                settings.upstream_timeout,
            )?,
            access_key: settings.required_access_key().map(String::from),
            mode: settings.mode,
            start_time: Instant::now(),
            stats: Stats::new(),
        })
    }
}

/// `/proxy` and unknown paths sit behind the auth guard; `/health` does not.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/proxy", get(relay_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            bearer_auth_guard,
        ))
        .route("/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
