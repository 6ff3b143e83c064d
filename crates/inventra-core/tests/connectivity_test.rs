#![allow(clippy::unwrap_used)]
// Integration tests for `ConnectivityMonitor` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inventra_api::{ApiClient, TokenCell};
use inventra_core::mirror::MirrorStore;
use inventra_core::{ConnectivityMonitor, Notifier, Severity};

fn monitor_for(uri: &str, threshold: Duration) -> (tempfile::TempDir, ConnectivityMonitor, Notifier) {
    let dir = tempfile::tempdir().unwrap();
    let mirror = MirrorStore::new(dir.path());
    let notifier = Notifier::new(mirror);

    let base_url = Url::parse(uri).unwrap();
    let api = Arc::new(ApiClient::with_client(
        reqwest::Client::new(),
        base_url,
        TokenCell::new(),
    ));

    let monitor = ConnectivityMonitor::new(
        api,
        notifier.clone(),
        Duration::from_millis(50),
        threshold,
    );
    (dir, monitor, notifier)
}

fn healthy_body() -> serde_json::Value {
    json!({ "success": true, "data": { "status": "ok" } })
}

#[tokio::test]
async fn successful_probe_is_healthy() {
    let server = MockServer::start().await;
    let (_dir, monitor, _notifier) = monitor_for(&server.uri(), Duration::from_secs(5));

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(healthy_body()))
        .mount(&server)
        .await;

    monitor.tick().await;

    let metrics = monitor.metrics().borrow().clone();
    assert!(metrics.healthy);
    assert!(metrics.latency.is_some());
    assert!(metrics.last_success_at.is_some());
    assert_eq!(metrics.consecutive_failures, 0);
}

#[tokio::test]
async fn one_failed_probe_degrades_with_a_single_notification() {
    // Nothing listens on this port.
    let (_dir, monitor, notifier) = monitor_for("http://127.0.0.1:9", Duration::from_secs(5));
    let mut rx = notifier.subscribe();

    monitor.tick().await;
    let metrics = monitor.metrics().borrow().clone();
    assert!(!metrics.healthy);
    assert!(metrics.latency.is_none());
    assert_eq!(metrics.consecutive_failures, 1);

    // Exactly one degraded notification for the transition...
    let n = rx.recv().await.unwrap();
    assert_eq!(n.severity, Severity::Warning);

    // ...and none for subsequent failures while already degraded.
    monitor.tick().await;
    monitor.tick().await;
    let metrics = monitor.metrics().borrow().clone();
    assert_eq!(metrics.consecutive_failures, 3);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(
        rx.try_recv().is_err(),
        "stable degraded state must stay quiet"
    );
}

#[tokio::test]
async fn recovery_emits_one_restored_notification() {
    let server = MockServer::start().await;
    let (_dir, monitor, notifier) = monitor_for(&server.uri(), Duration::from_secs(5));
    let mut rx = notifier.subscribe();

    // First two probes fail, then the endpoint comes back.
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(healthy_body()))
        .mount(&server)
        .await;

    monitor.tick().await;
    monitor.tick().await;
    monitor.tick().await;

    let metrics = monitor.metrics().borrow().clone();
    assert!(metrics.healthy);
    assert_eq!(metrics.consecutive_failures, 0);

    let first = rx.recv().await.unwrap();
    assert_eq!(first.severity, Severity::Warning);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.severity, Severity::Success);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn slow_probe_counts_as_unhealthy() {
    let server = MockServer::start().await;
    // Threshold far below the response delay: the probe succeeds but the
    // link is too slow to be useful.
    let (_dir, monitor, _notifier) = monitor_for(&server.uri(), Duration::from_millis(10));

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(healthy_body())
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    monitor.tick().await;

    let metrics = monitor.metrics().borrow().clone();
    assert!(!metrics.healthy);
    assert!(metrics.latency.is_some(), "probe itself succeeded");
}

#[tokio::test]
async fn start_is_idempotent_and_stop_halts_probing() {
    let server = MockServer::start().await;
    let (_dir, monitor, _notifier) = monitor_for(&server.uri(), Duration::from_secs(5));

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(healthy_body()))
        .mount(&server)
        .await;

    monitor.start().await;
    monitor.start().await; // no second loop
    tokio::time::sleep(Duration::from_millis(120)).await;
    monitor.stop().await;

    let after_stop = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let later = server.received_requests().await.unwrap().len();

    assert!(after_stop >= 1);
    assert_eq!(after_stop, later, "no probes after stop()");
}
