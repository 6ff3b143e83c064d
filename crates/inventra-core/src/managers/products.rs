// ── Product manager ──

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use inventra_api::ApiClient;
use inventra_api::models::ProductRecord;

use crate::authz::{self, Action};
use crate::connectivity::ConnectivityMonitor;
use crate::error::CoreError;
use crate::hybrid::{FetchFn, HybridOptions, HybridResult, HybridSource};
use crate::mirror::{KEY_PRODUCTS, MirrorStore};
use crate::model::{Notification, Product, ProductDraft, ProductPatch, UserIdentity};
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

/// CRUD over products with role checks and dual-write semantics.
///
/// Sole writer of the `products` mirror key and the products collection
/// in the in-memory store.
#[derive(Clone)]
pub struct ProductManager {
    inner: Arc<ProductInner>,
}

struct ProductInner {
    api: Option<Arc<ApiClient>>,
    monitor: Option<ConnectivityMonitor>,
    mirror: MirrorStore,
    store: Arc<InventoryStore>,
    notifier: Notifier,
    source: HybridSource<Vec<Product>>,
}

impl ProductManager {
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
            let fetch: FetchFn<Vec<Product>> = Arc::new(move || {
                let api = Arc::clone(&api);
                let mirror = mirror.clone();
                let store = Arc::clone(&store);
                Box::pin(async move {
                    let records = api.list_products().await.map_err(CoreError::from)?;
                    let products: Vec<Product> =
                        records.into_iter().map(Product::from).collect();
                    // Read-repair: a confirmed remote read refreshes both
                    // local views.
                    if let Err(e) = mirror.put(KEY_PRODUCTS, &products).await {
                        warn!(error = %e, "could not mirror product list");
                    }
                    store
                        .products
                        .replace_all(products.iter().map(|p| (p.id.clone(), p.clone())));
                    Ok(products)
                })
            });
            fetch
        });

        let local = {
            let mirror = mirror.clone();
            let store = Arc::clone(&store);
            let fetch: FetchFn<Vec<Product>> = Arc::new(move || {
                let mirror = mirror.clone();
                let store = Arc::clone(&store);
                Box::pin(async move {
                    let products: Vec<Product> = mirror.get_list(KEY_PRODUCTS).await?;
                    store
                        .products
                        .replace_all(products.iter().map(|p| (p.id.clone(), p.clone())));
                    Ok(products)
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
            Some((notifier.clone(), "products".into())),
        );

        Self {
            inner: Arc::new(ProductInner {
                api,
                monitor,
                mirror,
                store,
                notifier,
                source,
            }),
        }
    }

    // ── Read path (delegates to the hybrid source) ───────────────────

    /// Resolve the product list: remote preferred, mirror as fallback.
    pub async fn list(&self) -> Result<HybridResult<Vec<Product>>, CoreError> {
        self.inner.source.load().await
    }

    /// Manual refresh: retry budget reset, in-flight chains superseded.
    pub async fn refresh(&self) -> Result<HybridResult<Vec<Product>>, CoreError> {
        self.inner.source.refresh().await
    }

    /// Subscribe to published resolutions.
    pub fn subscribe(&self) -> watch::Receiver<Option<HybridResult<Vec<Product>>>> {
        self.inner.source.subscribe()
    }

    pub async fn start_polling(&self, interval: Duration) {
        self.inner.source.start_auto_refresh(interval).await;
    }

    pub async fn stop_polling(&self) {
        self.inner.source.stop_auto_refresh().await;
    }

    // ── Write path ───────────────────────────────────────────────────

    /// Create a product. The record -- id, timestamps, derived status --
    /// is built locally, written remotely while healthy, and mirrored
    /// only after the remote confirms.
    pub async fn add(
        &self,
        actor: &UserIdentity,
        draft: ProductDraft,
    ) -> Result<Product, CoreError> {
        authz::require(actor.role, Action::CreateProduct)?;
        if draft.name.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "product name must not be empty".into(),
            });
        }

        let product = Product::from_draft(draft);
        let product = self.write_through(product, WriteVerb::Create).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!("Product '{}' added", product.name)))
            .await;
        Ok(product)
    }

    /// Apply a patch to an existing product.
    pub async fn update(
        &self,
        actor: &UserIdentity,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, CoreError> {
        authz::require(actor.role, Action::UpdateProduct)?;

        let mut product = self.lookup(id).await?;
        product.apply(patch);

        let product = self.write_through(product, WriteVerb::Update).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Product '{}' updated",
                product.name
            )))
            .await;
        Ok(product)
    }

    /// Delete a product.
    pub async fn delete(&self, actor: &UserIdentity, id: &str) -> Result<(), CoreError> {
        authz::require(actor.role, Action::DeleteProduct)?;

        let product = self.lookup(id).await?;

        if let Some(api) = self.writable_remote() {
            if let Err(e) = api.delete_product(id).await {
                let err = CoreError::from(e);
                self.notify_write_failure("delete", &err).await;
                return Err(err);
            }
        }

        self.remove_local(id).await?;
        self.inner
            .notifier
            .publish(Notification::success(format!(
                "Product '{}' deleted",
                product.name
            )))
            .await;
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Remote-first dual write. On remote failure nothing local changes:
    /// the caller sees the error, and mirror and memory stay consistent
    /// with the last confirmed state.
    async fn write_through(&self, product: Product, verb: WriteVerb) -> Result<Product, CoreError> {
        let product = match self.writable_remote() {
            Some(api) => {
                let record = ProductRecord::from(&product);
                let sent = match verb {
                    WriteVerb::Create => api.create_product(&record).await,
                    WriteVerb::Update => api.update_product(&record).await,
                };
                let confirmed = match sent {
                    Ok(confirmed) => confirmed,
                    Err(e) => {
                        let err = CoreError::from(e);
                        self.notify_write_failure(verb.as_str(), &err).await;
                        return Err(err);
                    }
                };
                Product::from(confirmed)
            }
            None => {
                debug!(id = %product.id, "remote not writable, saving locally only");
                product
            }
        };

        self.commit_local(product.clone()).await?;
        Ok(product)
    }

    /// Mirror + in-memory upsert of a confirmed record.
    async fn commit_local(&self, product: Product) -> Result<(), CoreError> {
        let mut list: Vec<Product> = self.inner.mirror.get_list(KEY_PRODUCTS).await?;
        match list.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product.clone(),
            None => list.push(product.clone()),
        }
        self.inner.mirror.put(KEY_PRODUCTS, &list).await?;
        self.inner.store.products.upsert(product.id.clone(), product);
        Ok(())
    }

    async fn remove_local(&self, id: &str) -> Result<(), CoreError> {
        let mut list: Vec<Product> = self.inner.mirror.get_list(KEY_PRODUCTS).await?;
        list.retain(|p| p.id != id);
        self.inner.mirror.put(KEY_PRODUCTS, &list).await?;
        self.inner.store.products.remove(id);
        Ok(())
    }

    /// Current record: in-memory first, mirror second.
    async fn lookup(&self, id: &str) -> Result<Product, CoreError> {
        if let Some(product) = self.inner.store.product(id) {
            return Ok((*product).clone());
        }
        let list: Vec<Product> = self.inner.mirror.get_list(KEY_PRODUCTS).await?;
        list.into_iter()
            .find(|p| p.id == id)
            .ok_or(CoreError::NotFound {
                entity: "product",
                id: id.to_owned(),
            })
    }

    /// The remote client, but only while writes should go remote-first.
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
            .publish(Notification::error(format!(
                "Could not {verb} product: {err}"
            )))
            .await;
    }
}
