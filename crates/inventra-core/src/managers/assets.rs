// ── Asset manager ──
//
// Same dual-write shape as the product manager, plus the circulation
// state machine: borrow and return are guarded transitions, deletion is
// blocked while an asset is out, and ordinary updates may not move an
// asset in or out of `Borrowed`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use inventra_api::ApiClient;
use inventra_api::models::AssetRecord;

use crate::authz::{self, Action};
use crate::connectivity::ConnectivityMonitor;
use crate::error::CoreError;
use crate::hybrid::{FetchFn, HybridOptions, HybridResult, HybridSource};
use crate::mirror::{KEY_ASSETS, MirrorStore};
use crate::model::{Asset, AssetDraft, AssetPatch, AssetStatus, Notification, UserIdentity};
use crate::notify::Notifier;
use crate::store::InventoryStore;

#[derive(Clone, Copy)]
enum WriteVerb {
    Create,
    Update,
}

impl WriteVerb {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// CRUD plus borrow/return over assets.
///
/// Sole writer of the `assets` mirror key and the assets collection in
/// the in-memory store.
#[derive(Clone)]
pub struct AssetManager {
    inner: Arc<AssetInner>,
}

struct AssetInner {
    api: Option<Arc<ApiClient>>,
    monitor: Option<ConnectivityMonitor>,
    mirror: MirrorStore,
    store: Arc<InventoryStore>,
    notifier: Notifier,
    source: HybridSource<Vec<Asset>>,
}

impl AssetManager {
    pub fn new(
        api: Option<Arc<ApiClient>>,
        monitor: Option<ConnectivityMonitor>,
        mirror: MirrorStore,
        store: Arc<InventoryStore>,
        notifier: Notifier,
        options: HybridOptions,
    ) -> Self {
        let remote = api.as_ref().map(|api| {
            let api = Arc::clone(api);
            let mirror = mirror.clone();
            let store = Arc::clone(&store);
            let fetch: FetchFn<Vec<Asset>> = Arc::new(move || {
                let api = Arc::clone(&api);
                let mirror = mirror.clone();
                let store = Arc::clone(&store);
                Box::pin(async move {
                    let records = api.list_assets().await.map_err(CoreError::from)?;
                    let assets: Vec<Asset> = records.into_iter().map(Asset::from).collect();
                    if let Err(e) = mirror.put(KEY_ASSETS, &assets).await {
                        warn!(error = %e, "could not mirror asset list");
                    }
                    store
                        .assets
                        .replace_all(assets.iter().map(|a| (a.id.clone(), a.clone())));
                    Ok(assets)
                })
            });
            fetch
        });

        let local = {
            let mirror = mirror.clone();
            let store = Arc::clone(&store);
            let fetch: FetchFn<Vec<Asset>> = Arc::new(move || {
                let mirror = mirror.clone();
                let store = Arc::clone(&store);
                Box::pin(async move {
                    let assets: Vec<Asset> = mirror.get_list(KEY_ASSETS).await?;
                    store
                        .assets
                        .replace_all(assets.iter().map(|a| (a.id.clone(), a.clone())));
                    Ok(assets)
                })
            });
            fetch
        };

        let health = monitor.as_ref().map(ConnectivityMonitor::metrics);
        let source = HybridSource::new(
            remote,
            local,
            health,
            options,
            Some((notifier.clone(), "assets".into())),
        );

        Self {
            inner: Arc::new(AssetInner {
                api,
                monitor,
                mirror,
                store,
                notifier,
                source,
            }),
        }
    }

    // ── Read path ────────────────────────────────────────────────────

    pub async fn list(&self) -> Result<HybridResult<Vec<Asset>>, CoreError> {
        self.inner.source.load().await
    }

    pub async fn refresh(&self) -> Result<HybridResult<Vec<Asset>>, CoreError> {
        self.inner.source.refresh().await
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HybridResult<Vec<Asset>>>> {
        self.inner.source.subscribe()
    }

    pub async fn start_polling(&self, interval: Duration) {
        self.inner.source.start_auto_refresh(interval).await;
    }

    pub async fn stop_polling(&self) {
        self.inner.source.stop_auto_refresh().await;
    }

    // ── Write path ───────────────────────────────────────────────────

    /// Register an asset; it enters circulation as `Available`.
    pub async fn add(&self, actor: &UserIdentity, draft: AssetDraft) -> Result<Asset, CoreError> {
        authz::require(actor.role, Action::CreateAsset)?;
        if draft.name.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "asset name must not be empty".into(),
            });
        }

        let asset = Asset::from_draft(draft);
        let asset = self.write_through(asset, WriteVerb::Create).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!("Asset '{}' added", asset.name)))
            .await;
        Ok(asset)
    }

    /// Apply a patch. Circulation changes are rejected here: moving in or
    /// out of `Borrowed` goes through [`borrow`](Self::borrow) and
    /// [`hand_in`](Self::hand_in).
    pub async fn update(
        &self,
        actor: &UserIdentity,
        id: &str,
        patch: AssetPatch,
    ) -> Result<Asset, CoreError> {
        authz::require(actor.role, Action::UpdateAsset)?;

        let mut asset = self.lookup(id).await?;
        if patch.status.is_some()
            && (asset.status == AssetStatus::Borrowed || patch.status == Some(AssetStatus::Borrowed))
        {
            return Err(CoreError::InvalidStateTransition {
                action: "update",
                status: asset.status,
            });
        }
        asset.apply(patch);

        let asset = self.write_through(asset, WriteVerb::Update).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Asset '{}' updated",
                asset.name
            )))
            .await;
        Ok(asset)
    }

    /// Delete an asset. Rejected while borrowed; the borrower has it.
    pub async fn delete(&self, actor: &UserIdentity, id: &str) -> Result<(), CoreError> {
        authz::require(actor.role, Action::DeleteAsset)?;

        let asset = self.lookup(id).await?;
        if !asset.status.can_delete() {
            return Err(CoreError::InvalidStateTransition {
                action: "delete",
                status: asset.status,
            });
        }

        if let Some(api) = self.writable_remote() {
            if let Err(e) = api.delete_asset(id).await {
                let err = CoreError::from(e);
                self.notify_write_failure("delete", &err).await;
                return Err(err);
            }
        }

        self.remove_local(id).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Asset '{}' deleted",
                asset.name
            )))
            .await;
        Ok(())
    }

    /// Check an available asset out to an assignee.
    pub async fn borrow(
        &self,
        actor: &UserIdentity,
        id: &str,
        assignee: &str,
    ) -> Result<Asset, CoreError> {
        authz::require(actor.role, Action::BorrowAsset)?;

        let mut asset = self.lookup(id).await?;
        if !asset.status.can_borrow() {
            return Err(CoreError::InvalidStateTransition {
                action: "borrow",
                status: asset.status,
            });
        }
        asset.status = AssetStatus::Borrowed;
        asset.assignee = Some(assignee.to_owned());
        asset.updated_at = Utc::now();

        let asset = self.write_through(asset, WriteVerb::Update).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Asset '{}' borrowed by {assignee}",
                asset.name
            )))
            .await;
        Ok(asset)
    }

    /// Return a borrowed asset to circulation.
    pub async fn hand_in(&self, actor: &UserIdentity, id: &str) -> Result<Asset, CoreError> {
        authz::require(actor.role, Action::ReturnAsset)?;

        let mut asset = self.lookup(id).await?;
        if !asset.status.can_return() {
            return Err(CoreError::InvalidStateTransition {
                action: "return",
                status: asset.status,
            });
        }
        asset.status = AssetStatus::Available;
        asset.assignee = None;
        asset.updated_at = Utc::now();

        let asset = self.write_through(asset, WriteVerb::Update).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Asset '{}' returned",
                asset.name
            )))
            .await;
        Ok(asset)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Remote-first dual write; see the product manager for the
    /// consistency contract.
    async fn write_through(&self, asset: Asset, verb: WriteVerb) -> Result<Asset, CoreError> {
        let asset = match self.writable_remote() {
            Some(api) => {
                let record = AssetRecord::from(&asset);
                let sent = match verb {
                    WriteVerb::Create => api.create_asset(&record).await,
                    WriteVerb::Update => api.update_asset(&record).await,
                };
                let confirmed = match sent {
                    Ok(confirmed) => confirmed,
                    Err(e) => {
                        let err = CoreError::from(e);
                        self.notify_write_failure(verb.as_str(), &err).await;
                        return Err(err);
                    }
                };
                Asset::from(confirmed)
            }
            None => {
                debug!(id = %asset.id, "remote not writable, saving locally only");
                asset
            }
        };

        self.commit_local(asset.clone()).await?;
        Ok(asset)
    }

    async fn commit_local(&self, asset: Asset) -> Result<(), CoreError> {
        let mut list: Vec<Asset> = self.inner.mirror.get_list(KEY_ASSETS).await?;
        match list.iter_mut().find(|a| a.id == asset.id) {
            Some(slot) => *slot = asset.clone(),
            None => list.push(asset.clone()),
        }
        self.inner.mirror.put(KEY_ASSETS, &list).await?;
        self.inner.store.assets.upsert(asset.id.clone(), asset);
        Ok(())
    }

    async fn remove_local(&self, id: &str) -> Result<(), CoreError> {
        let mut list: Vec<Asset> = self.inner.mirror.get_list(KEY_ASSETS).await?;
        list.retain(|a| a.id != id);
        self.inner.mirror.put(KEY_ASSETS, &list).await?;
        self.inner.store.assets.remove(id);
        Ok(())
    }

    async fn lookup(&self, id: &str) -> Result<Asset, CoreError> {
        if let Some(asset) = self.inner.store.asset(id) {
            return Ok((*asset).clone());
        }
        let list: Vec<Asset> = self.inner.mirror.get_list(KEY_ASSETS).await?;
        list.into_iter()
            .find(|a| a.id == id)
            .ok_or(CoreError::NotFound {
                entity: "asset",
                id: id.to_owned(),
            })
    }

    fn writable_remote(&self) -> Option<&Arc<ApiClient>> {
        let api = self.inner.api.as_ref()?;
        let healthy = self
            .inner
            .monitor
            .as_ref()
            .is_none_or(ConnectivityMonitor::is_healthy);
        healthy.then_some(api)
    }

    async fn notify_write_failure(&self, verb: &str, err: &CoreError) {
        self.inner
            .notifier
            .publish(Notification::error(format!("Could not {verb} asset: {err}")))
            .await;
    }
}
