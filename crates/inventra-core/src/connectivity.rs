// ── Connectivity monitor ──
//
// Periodically probes the transport client to classify the remote as
// healthy or unhealthy and measure latency. Metrics are published through
// a `watch` channel; a notification goes out on each health *transition*,
// never on every tick. Exists only when a remote is configured.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use inventra_api::ApiClient;

use crate::model::{ConnectionMetrics, Notification};
use crate::notify::Notifier;

/// Latency above this marks the remote unhealthy even when the probe
/// succeeds.
pub const HEALTHY_THRESHOLD: Duration = Duration::from_secs(5);

/// Supervises remote reachability.
///
/// Cheaply cloneable; all clones share the same metrics channel and
/// probe task.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    api: Arc<ApiClient>,
    notifier: Notifier,
    metrics: watch::Sender<ConnectionMetrics>,
    interval: Duration,
    healthy_threshold: Duration,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl ConnectivityMonitor {
    pub fn new(
        api: Arc<ApiClient>,
        notifier: Notifier,
        interval: Duration,
        healthy_threshold: Duration,
    ) -> Self {
        let (metrics, _) = watch::channel(ConnectionMetrics::default());
        Self {
            inner: Arc::new(MonitorInner {
                api,
                notifier,
                metrics,
                interval,
                healthy_threshold,
                task: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to metrics updates.
    pub fn metrics(&self) -> watch::Receiver<ConnectionMetrics> {
        self.inner.metrics.subscribe()
    }

    /// The current health flag.
    pub fn is_healthy(&self) -> bool {
        self.inner.metrics.borrow().healthy
    }

    /// Execute one probe and return its round-trip time, or `None` on
    /// failure. Never errors -- an unreachable remote is a measurement,
    /// not a fault.
    pub async fn measure_latency(&self) -> Option<Duration> {
        let started = tokio::time::Instant::now();
        match self.inner.api.probe().await {
            Ok(()) => Some(started.elapsed()),
            Err(e) => {
                debug!(error = %e, "probe failed");
                None
            }
        }
    }

    /// Probe once and fold the measurement into the published metrics.
    pub async fn tick(&self) {
        let latency = self.measure_latency().await;
        self.apply_probe(latency);
    }

    /// Start the probe loop. Idempotent: a second start while the task is
    /// running is a no-op. The first probe fires immediately.
    pub async fn start(&self) {
        let mut guard = self.inner.task.lock().await;
        if guard.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.inner.interval);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let latency = monitor.measure_latency().await;
                        // A probe that completes after stop() must not
                        // publish; the socket itself is not aborted.
                        if token.is_cancelled() {
                            break;
                        }
                        monitor.apply_probe(latency);
                    }
                }
            }
            debug!("connectivity monitor stopped");
        });

        *guard = Some((cancel, handle));
        info!(interval = ?self.inner.interval, "connectivity monitor started");
    }

    /// Stop the probe loop.
    pub async fn stop(&self) {
        let task = self.inner.task.lock().await.take();
        if let Some((cancel, handle)) = task {
            cancel.cancel();
            let _ = handle.await;
        }
    }

    /// Fold one measurement into the metrics and announce transitions.
    fn apply_probe(&self, latency: Option<Duration>) {
        let healthy = latency.is_some_and(|l| l < self.inner.healthy_threshold);
        let was_healthy = self.inner.metrics.borrow().healthy;

        self.inner.metrics.send_modify(|m| {
            m.latency = latency;
            m.healthy = healthy;
            if healthy {
                m.consecutive_failures = 0;
                m.last_success_at = Some(Utc::now());
            } else {
                m.consecutive_failures += 1;
            }
        });

        // Announce transitions only; stable state stays quiet.
        if healthy != was_healthy {
            let notifier = self.inner.notifier.clone();
            let notification = if healthy {
                info!("connection restored");
                Notification::success("Connection restored")
            } else {
                warn!("connection degraded, serving local data");
                Notification::warning("Connection lost -- working from local data")
            };
            tokio::spawn(async move { notifier.publish(notification).await });
        }
    }
}
