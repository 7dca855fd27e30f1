//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload with the server version,
//! uptime, run mode, admission gate occupancy, and cumulative request
//! counters.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub mode: String,
    pub forward_proxy: bool,
    pub gate: GateHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct GateHealth {
    pub capacity: usize,
    pub available: usize,
    pub waiting: usize,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_relayed: u64,
    pub requests_failed: u64,
    pub requests_rejected: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        mode: state.mode.to_string(),
        forward_proxy: state.upstream.has_forward_proxy(),
        gate: GateHealth {
            capacity: state.gate.capacity(),
            available: state.gate.available_permits(),
            waiting: state.gate.waiting(),
        },
        stats: StatsResponse {
            requests_relayed: state.stats.relayed.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
            requests_rejected: state.stats.rejected.load(Ordering::Relaxed),
        },
    })
}
