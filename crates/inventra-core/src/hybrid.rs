// ── Hybrid data source ──
//
// Generic read-path resolver for one logical resource: prefer the remote
// fetch, retry transient failures with bounded exponential backoff, and
// fall back to the persisted local mirror with the last error attached.
// Resolutions are published through a `watch` channel; a generation
// counter keeps a superseded in-flight chain from clobbering the result
// of a newer manual refresh.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{ConnectionMetrics, Notification, Source};
use crate::notify::Notifier;

/// Boxed future produced by a fetch function.
pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send>>;

/// A fetch function: remote call or local-mirror read for one resource.
pub type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// The unit value flowing out of a hybrid load.
///
/// `data` is always populated -- authoritative from the remote, or
/// last-known-good from the mirror. `error` is set only when the remote
/// attempt failed and the fallback answered.
#[derive(Debug, Clone)]
pub struct HybridResult<T> {
    pub data: T,
    pub source: Source,
    pub fetched_at: DateTime<Utc>,
    pub error: Option<Arc<CoreError>>,
}

/// Retry tuning for one hybrid source.
#[derive(Debug, Clone)]
pub struct HybridOptions {
    /// Retry attempts after the initial remote failure.
    pub retries: u32,
    /// Base backoff delay: `delay = base_delay * 2^(attempt - 1)`.
    pub base_delay: Duration,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Remote-preferring resolver for a single logical resource.
///
/// Cheaply cloneable; all clones share the published result, the
/// generation counter, and the in-flight lock.
pub struct HybridSource<T: Clone + Send + Sync + 'static> {
    inner: Arc<HybridInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for HybridSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct HybridInner<T> {
    remote: Option<FetchFn<T>>,
    local: FetchFn<T>,
    health: Option<watch::Receiver<ConnectionMetrics>>,
    options: HybridOptions,
    /// Announces the *final* fallback of a failed chain -- individual
    /// retries stay quiet. The string names the resource in the message.
    notice: Option<(Notifier, String)>,
    result: watch::Sender<Option<HybridResult<T>>>,
    /// Bumped by `refresh()`; a chain started under an older value must
    /// not publish.
    generation: AtomicU64,
    /// Serializes loads: exactly one resolution in flight per source.
    load_lock: Mutex<()>,
    auto_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl<T: Clone + Send + Sync + 'static> HybridSource<T> {
    /// Create a source. `remote: None` means offline-only: every load
    /// resolves from the local function without entering the retry loop.
    /// `health` is the connectivity monitor's metrics; `None` skips the
    /// viability check (always try a configured remote).
    pub fn new(
        remote: Option<FetchFn<T>>,
        local: FetchFn<T>,
        health: Option<watch::Receiver<ConnectionMetrics>>,
        options: HybridOptions,
        notice: Option<(Notifier, String)>,
    ) -> Self {
        let (result, _) = watch::channel(None);
        Self {
            inner: Arc::new(HybridInner {
                remote,
                local,
                health,
                options,
                notice,
                result,
                generation: AtomicU64::new(0),
                load_lock: Mutex::new(()),
                auto_task: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to published resolutions.
    pub fn subscribe(&self) -> watch::Receiver<Option<HybridResult<T>>> {
        self.inner.result.subscribe()
    }

    /// The most recently published resolution, if any.
    pub fn latest(&self) -> Option<HybridResult<T>> {
        self.inner.result.borrow().clone()
    }

    /// Resolve the resource under the current generation.
    ///
    /// Errors only if the local fallback itself fails; a remote failure
    /// is recovered into a `LocalFallback` result with the error attached.
    pub async fn load(&self) -> Result<HybridResult<T>, CoreError> {
        let generation = self.inner.generation.load(Ordering::Acquire);
        self.resolve(generation).await
    }

    /// Manual refresh: reset the retry budget and supersede any in-flight
    /// chain. The superseded chain abandons its retries at the next
    /// checkpoint and its resolution is not published.
    pub async fn refresh(&self) -> Result<HybridResult<T>, CoreError> {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.resolve(generation).await
    }

    // ── Auto-refresh ─────────────────────────────────────────────────

    /// Start polling on `interval`. Idempotent. Each tick re-loads the
    /// resource, but **only** while the latest resolution came from the
    /// remote -- polling on fallback data would re-trigger the backoff
    /// cascade against a remote that is already known to be down.
    pub async fn start_auto_refresh(&self, interval: Duration) {
        let mut guard = self.inner.auto_task.lock().await;
        if guard.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let source = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let on_remote = source
                            .latest()
                            .is_some_and(|r| r.source.is_remote());
                        if on_remote {
                            if let Err(e) = source.load().await {
                                warn!(error = %e, "auto-refresh failed");
                            }
                        }
                    }
                }
            }
        });

        *guard = Some((cancel, handle));
    }

    /// Stop polling. The current tick's in-flight request, if any, is not
    /// aborted; its resolution still goes through the generation check.
    pub async fn stop_auto_refresh(&self) {
        let task = self.inner.auto_task.lock().await.take();
        if let Some((cancel, handle)) = task {
            cancel.cancel();
            let _ = handle.await;
        }
    }

    // ── Resolution ───────────────────────────────────────────────────

    async fn resolve(&self, generation: u64) -> Result<HybridResult<T>, CoreError> {
        let _guard = self.inner.load_lock.lock().await;

        let Some(remote) = self.inner.remote.as_ref() else {
            return self.fall_back(generation, None).await;
        };
        if !self.remote_viable() {
            debug!("remote unhealthy, resolving locally");
            return self.fall_back(generation, None).await;
        }

        let mut attempt: u32 = 0;
        let last_error = loop {
            attempt += 1;
            match (remote.as_ref())().await {
                Ok(data) => {
                    let result = HybridResult {
                        data,
                        source: Source::Remote,
                        fetched_at: Utc::now(),
                        error: None,
                    };
                    self.publish(generation, &result);
                    return Ok(result);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "remote fetch failed");
                    if attempt > self.inner.options.retries {
                        break e;
                    }
                    let delay = self.inner.options.base_delay * 2u32.saturating_pow(attempt - 1);
                    debug!(?delay, "retrying after backoff");
                    tokio::time::sleep(delay).await;
                    if self.is_stale(generation) {
                        debug!("superseded by manual refresh, abandoning retry chain");
                        return self.fall_back(generation, Some(e)).await;
                    }
                }
            }
        };

        self.fall_back(generation, Some(last_error)).await
    }

    /// Resolve from the local function. Only a local failure escapes as
    /// an error.
    async fn fall_back(
        &self,
        generation: u64,
        error: Option<CoreError>,
    ) -> Result<HybridResult<T>, CoreError> {
        let data = (self.inner.local.as_ref())().await?;
        let result = HybridResult {
            data,
            source: Source::LocalFallback,
            fetched_at: Utc::now(),
            error: error.map(Arc::new),
        };
        self.publish(generation, &result);
        Ok(result)
    }

    fn publish(&self, generation: u64, result: &HybridResult<T>) {
        if self.is_stale(generation) {
            debug!("discarding stale resolution");
            return;
        }

        // Announce entering degraded reads once, not per retry and not
        // while already degraded.
        if let Some((notifier, label)) = &self.inner.notice {
            let was_degraded = self
                .inner
                .result
                .borrow()
                .as_ref()
                .is_some_and(|prev| prev.error.is_some());
            if result.error.is_some() && !was_degraded {
                let notifier = notifier.clone();
                let message =
                    format!("Couldn't refresh {label} from the server; showing local data");
                tokio::spawn(async move {
                    notifier.publish(Notification::warning(message)).await;
                });
            }
        }

        self.inner
            .result
            .send_modify(|slot| *slot = Some(result.clone()));
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) != generation
    }

    fn remote_viable(&self) -> bool {
        match &self.inner.health {
            Some(metrics) => metrics.borrow().healthy,
            None => true,
        }
    }
}
