// Analytics endpoints (read-only)
//
// Server-computed dashboards: overview counters, movement trends, category
// breakdowns, stock velocity, insights, and alerts. No math happens on this
// side of the wire.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    AlertRecord, CategoryBreakdown, InsightRecord, MovementRecord, OverviewStats, StockVelocity,
    TrendPoint,
};

impl ApiClient {
    /// `GET /api/analytics/overview`
    pub async fn analytics_overview(&self) -> Result<OverviewStats, Error> {
        debug!("fetching analytics overview");
        self.get("analytics/overview").await
    }

    /// `GET /api/analytics/trends`
    pub async fn analytics_trends(&self) -> Result<Vec<TrendPoint>, Error> {
        debug!("fetching stock trends");
        self.get("analytics/trends").await
    }

    /// `GET /api/analytics/category-analysis`
    pub async fn analytics_categories(&self) -> Result<Vec<CategoryBreakdown>, Error> {
        debug!("fetching category analysis");
        self.get("analytics/category-analysis").await
    }

    /// `GET /api/analytics/stock-velocity`
    pub async fn analytics_stock_velocity(&self) -> Result<Vec<StockVelocity>, Error> {
        debug!("fetching stock velocity");
        self.get("analytics/stock-velocity").await
    }

    /// `GET /api/analytics/insights`
    pub async fn analytics_insights(&self) -> Result<Vec<InsightRecord>, Error> {
        debug!("fetching insights");
        self.get("analytics/insights").await
    }

    /// `GET /api/analytics/alerts`
    pub async fn analytics_alerts(&self) -> Result<Vec<AlertRecord>, Error> {
        debug!("fetching alerts");
        self.get("analytics/alerts").await
    }

    /// `GET /api/stock/movements`
    pub async fn stock_movements(&self) -> Result<Vec<MovementRecord>, Error> {
        debug!("fetching stock movements");
        self.get("stock/movements").await
    }
}
