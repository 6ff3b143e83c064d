// ── In-memory reactive store ──
//
// Last-known entity state shared between managers and presentation
// layers. Each entity manager is the sole writer of its own collection;
// everyone else reads snapshots or subscribes.

mod collection;

use std::sync::Arc;

use tokio::sync::watch;

pub(crate) use collection::EntityCollection;

use crate::model::{Asset, Product};

/// Central reactive store for inventory entities.
pub struct InventoryStore {
    pub(crate) products: EntityCollection<Product>,
    pub(crate) assets: EntityCollection<Asset>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self {
            products: EntityCollection::new(),
            assets: EntityCollection::new(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn products_snapshot(&self) -> Arc<Vec<Arc<Product>>> {
        self.products.snapshot()
    }

    pub fn assets_snapshot(&self) -> Arc<Vec<Arc<Asset>>> {
        self.assets.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn product(&self, id: &str) -> Option<Arc<Product>> {
        self.products.get(id)
    }

    pub fn asset(&self, id: &str) -> Option<Arc<Asset>> {
        self.assets.get(id)
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_products(&self) -> watch::Receiver<Arc<Vec<Arc<Product>>>> {
        self.products.subscribe()
    }

    pub fn subscribe_assets(&self) -> watch::Receiver<Arc<Vec<Arc<Asset>>>> {
        self.assets.subscribe()
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}
