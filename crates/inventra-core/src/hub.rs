// ── Hub: wiring and lifecycle ──
//
// Assembles the data layer from a `RuntimeConfig`: one transport client
// (when a remote is configured), one session manager, one connectivity
// monitor, and the entity managers, all sharing the token cell, the
// mirror, and the notifier. Consumers hold a `Hub` and pull components
// off it.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use inventra_api::{ApiClient, TlsMode, TokenCell, TransportConfig};

use crate::config::{RuntimeConfig, TlsVerification};
use crate::connectivity::ConnectivityMonitor;
use crate::error::CoreError;
use crate::hybrid::HybridOptions;
use crate::managers::{AssetManager, ProductManager};
use crate::mirror::MirrorStore;
use crate::model::Notification;
use crate::notify::Notifier;
use crate::session::SessionManager;
use crate::store::InventoryStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable. [`start()`](Self::start) restores the session and
/// brings up background tasks; [`shutdown()`](Self::shutdown) winds them
/// down without touching the persisted session.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: RuntimeConfig,
    api: Option<Arc<ApiClient>>,
    store: Arc<InventoryStore>,
    notifier: Notifier,
    session: SessionManager,
    monitor: Option<ConnectivityMonitor>,
    products: ProductManager,
    assets: AssetManager,
}

impl Hub {
    /// Wire up the data layer. Does not touch the network --
    /// call [`start()`](Self::start) for that.
    pub fn new(config: RuntimeConfig) -> Result<Self, CoreError> {
        let mirror = MirrorStore::new(&config.data_dir);
        let notifier = Notifier::new(mirror.clone());
        let token = TokenCell::new();

        let api = match &config.remote {
            Some(remote) => {
                let transport = TransportConfig {
                    tls: tls_to_transport(&remote.tls),
                    timeout: remote.timeout,
                    retries: remote.retries,
                    ..TransportConfig::default()
                };
                let client = ApiClient::new(remote.url.clone(), &transport, token.clone())?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let monitor = api.as_ref().map(|api| {
            ConnectivityMonitor::new(
                Arc::clone(api),
                notifier.clone(),
                config.probe_interval,
                crate::connectivity::HEALTHY_THRESHOLD,
            )
        });

        let store = Arc::new(InventoryStore::new());
        let session = SessionManager::new(
            api.clone(),
            token,
            mirror.clone(),
            notifier.clone(),
            config.refresh_interval,
        );
        let products = ProductManager::new(
            api.clone(),
            monitor.clone(),
            mirror.clone(),
            Arc::clone(&store),
            notifier.clone(),
            HybridOptions::default(),
        );
        let assets = AssetManager::new(
            api.clone(),
            monitor.clone(),
            mirror,
            Arc::clone(&store),
            notifier.clone(),
            HybridOptions::default(),
        );

        Ok(Self {
            inner: Arc::new(HubInner {
                config,
                api,
                store,
                notifier,
                session,
                monitor,
                products,
                assets,
            }),
        })
    }

    /// Restore the session and start background supervision: the
    /// connectivity probe loop and, when polling is configured, the
    /// entity auto-refresh loops.
    pub async fn start(&self) {
        self.inner.session.init().await;

        if let Some(monitor) = &self.inner.monitor {
            monitor.start().await;
        }
        if let Some(interval) = self.inner.config.polling_interval {
            self.inner.products.start_polling(interval).await;
            self.inner.assets.start_polling(interval).await;
        }
        info!(
            remote = self.inner.api.is_some(),
            "data layer started"
        );
    }

    /// Stop background tasks. The persisted session and mirror survive
    /// for the next start.
    pub async fn shutdown(&self) {
        self.inner.products.stop_polling().await;
        self.inner.assets.stop_polling().await;
        if let Some(monitor) = &self.inner.monitor {
            monitor.stop().await;
        }
        self.inner.session.teardown().await;
    }

    // ── Component accessors ──────────────────────────────────────────

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn products(&self) -> &ProductManager {
        &self.inner.products
    }

    pub fn assets(&self) -> &AssetManager {
        &self.inner.assets
    }

    /// The connectivity monitor; absent in offline-only mode.
    pub fn connectivity(&self) -> Option<&ConnectivityMonitor> {
        self.inner.monitor.as_ref()
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    /// Subscribe to user-visible notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifier.subscribe()
    }

    /// The transport client, for remote-only surfaces (analytics).
    pub fn remote(&self) -> Result<&Arc<ApiClient>, CoreError> {
        self.inner.api.as_ref().ok_or(CoreError::NotConfigured)
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
