//! Uptime ticker tests on paused (virtual) time.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use httpmeter_core::{HttpMetrics, MetricRegistry};
use httpmeter_gateway::{app_state::AppState, config::GatewayConfig, obs::UptimeTicker};
use tokio_util::sync::CancellationToken;

fn setup() -> (Arc<MetricRegistry>, HttpMetrics) {
    let mut reg = MetricRegistry::new();
    let m = HttpMetrics::declare(&mut reg, "service").unwrap();
    (Arc::new(reg), m)
}

fn uptime(reg: &MetricRegistry, m: &HttpMetrics) -> u64 {
    reg.counter_value(m.uptime(), &[]).unwrap_or(0)
}

#[tokio::test(start_paused = true)]
async fn counts_one_per_interval_without_traffic() {
    let (reg, m) = setup();
    let token = CancellationToken::new();
    let handle = UptimeTicker::spawn(Arc::clone(&reg), m, Duration::from_secs(1), token.clone());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(uptime(&reg, &m), 0);

    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(uptime(&reg, &m), 3);
    assert!(reg.snapshot().contains("\nservice_uptime 3\n"));

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stops_when_cancelled() {
    let (reg, m) = setup();
    let token = CancellationToken::new();
    let handle = UptimeTicker::spawn(Arc::clone(&reg), m, Duration::from_secs(1), token.clone());

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    token.cancel();
    handle.await.unwrap();
    let frozen = uptime(&reg, &m);
    assert_eq!(frozen, 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(uptime(&reg, &m), frozen);
}

#[tokio::test(start_paused = true)]
async fn app_state_uses_configured_interval() {
    let mut cfg = GatewayConfig::default();
    cfg.metrics.uptime_interval_ms = 250;
    let state = AppState::new(cfg).unwrap();
    let token = CancellationToken::new();
    let handle = state.spawn_uptime(token.clone());

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(uptime(&state.registry(), &state.metrics()), 4);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_clamped_instead_of_panicking() {
    let (reg, m) = setup();
    let token = CancellationToken::new();
    let handle = UptimeTicker::spawn(Arc::clone(&reg), m, Duration::ZERO, token.clone());

    tokio::time::sleep(Duration::from_micros(3_500)).await;
    assert_eq!(uptime(&reg, &m), 3);

    token.cancel();
    handle.await.unwrap();
}
