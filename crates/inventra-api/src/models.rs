// Wire types for the Inventra API.
//
// Every endpoint wraps its payload in the `Envelope<T>` shape. Records here
// stay close to the JSON the server emits; `inventra-core` converts them
// into canonical domain types (and derives product stock status itself).
// `#[serde(default)]` is used where older server builds omit fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard response envelope.
///
/// Every endpoint wraps its payload:
/// ```json
/// { "success": true, "data": {...}, "message": "optional", "error": "optional" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The server-side failure description, preferring `error` over `message`.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request failed".into())
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Authenticated user as the server describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
}

/// Payload of `POST /api/auth/login` and `POST /api/auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserRecord,
}

/// Payload of `GET /api/auth/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyData {
    pub user: UserRecord,
}

// ── Inventory records ────────────────────────────────────────────────

/// Product as stored remotely. Carries the quantitative fields the domain
/// layer derives stock status from; any `status` the server echoes back is
/// ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    #[serde(default)]
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asset as stored remotely. Unlike products, `status` is real state
/// (available/borrowed/...) rather than a derived value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Analytics ────────────────────────────────────────────────────────

/// Payload of `GET /api/analytics/overview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStats {
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_assets: u64,
    #[serde(default)]
    pub low_stock_count: u64,
    #[serde(default)]
    pub out_of_stock_count: u64,
    #[serde(default)]
    pub total_stock_value: f64,
}

/// One period of `GET /api/analytics/trends`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    #[serde(default)]
    pub stock_in: i64,
    #[serde(default)]
    pub stock_out: i64,
}

/// One row of `GET /api/analytics/category-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub stock_value: f64,
}

/// One row of `GET /api/analytics/stock-velocity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockVelocity {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub velocity: f64,
}

/// One entry of `GET /api/analytics/insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub id: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub message: String,
}

/// One entry of `GET /api/analytics/alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub product_id: Option<String>,
}

/// One row of `GET /api/stock/movements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: String,
    pub product_id: String,
    /// `"in"` or `"out"`.
    pub direction: String,
    pub quantity: u32,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}
