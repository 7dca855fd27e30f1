//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

mod common;

use std::time::Duration;

use common::{dev_settings, start_gateway};
use fetchgate::config::{RunMode, Settings};
use fetchgate::health::HealthResponse;

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let gateway = start_gateway(dev_settings()).await;

    let resp = reqwest::get(gateway.url("/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.gate.capacity, 4);
    assert_eq!(health.gate.available, 4);
    assert_eq!(health.stats.requests_relayed, 0);
    assert_eq!(health.stats.requests_failed, 0);
}

#[tokio::test]
async fn health_reports_production_mode() {
    let gateway = start_gateway(Settings {
        mode: RunMode::Production,
        access_key: Some("k".into()),
        ..dev_settings()
    })
    .await;

    let health: HealthResponse = reqwest::get(gateway.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.mode, "production");
}

#[tokio::test]
async fn unmatched_route_returns_404() {
    let gateway = start_gateway(dev_settings()).await;

    let resp = reqwest::get(gateway.url("/nonexistent")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let gateway = start_gateway(dev_settings()).await;
    let url = gateway.url("/health");

    assert!(reqwest::get(&url).await.is_ok());

    drop(gateway);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Fresh client so no pooled keep-alive connection is reused.
    let result = reqwest::Client::new().get(&url).send().await;
    assert!(result.is_err());
}
