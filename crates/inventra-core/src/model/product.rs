// ── Product domain types ──
//
// Stock status is derived from the quantitative fields, never stored
// authoritatively: whenever stock or min_stock change, status is recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived stock level classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify a stock level against its minimum threshold.
    pub fn derive(stock: u32, min_stock: u32) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if stock < min_stock {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Whether this level warrants operator attention.
    pub fn needs_attention(self) -> bool {
        !matches!(self, Self::InStock)
    }
}

/// The canonical product type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    pub unit_price: f64,
    pub status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller creating a product.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    pub unit_price: f64,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub min_stock: Option<u32>,
    pub unit_price: Option<f64>,
}

impl Product {
    /// Build a new record from a draft: generated id, fresh timestamps,
    /// derived status.
    pub fn from_draft(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: StockStatus::derive(draft.stock, draft.min_stock),
            name: draft.name,
            sku: draft.sku,
            category: draft.category,
            stock: draft.stock,
            min_stock: draft.min_stock,
            unit_price: draft.unit_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch, recompute status, and bump `updated_at`.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sku) = patch.sku {
            self.sku = Some(sku);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(min_stock) = patch.min_stock {
            self.min_stock = min_stock;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        self.status = StockStatus::derive(self.stock, self.min_stock);
        self.updated_at = Utc::now();
    }
}
