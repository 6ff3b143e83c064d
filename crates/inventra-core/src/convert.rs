// ── Wire <-> domain conversion ──
//
// Maps api-crate records into canonical domain types and back. Product
// status is derived here on the way in -- whatever the server echoes is
// ignored. Unknown enum strings degrade to conservative defaults rather
// than failing the whole payload.

use std::str::FromStr;

use tracing::warn;

use inventra_api::models::{AssetRecord, ProductRecord, UserRecord};

use crate::model::{Asset, AssetStatus, Product, Role, StockStatus, UserIdentity};

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            status: StockStatus::derive(record.stock, record.min_stock),
            id: record.id,
            name: record.name,
            sku: record.sku,
            category: record.category,
            stock: record.stock,
            min_stock: record.min_stock,
            unit_price: record.unit_price,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            category: product.category.clone(),
            stock: product.stock,
            min_stock: product.min_stock,
            unit_price: product.unit_price,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<AssetRecord> for Asset {
    fn from(record: AssetRecord) -> Self {
        let status = AssetStatus::from_str(&record.status).unwrap_or_else(|_| {
            // Unknown state: park the asset in maintenance rather than
            // letting it circulate with a status we cannot reason about.
            warn!(id = %record.id, status = %record.status, "unknown asset status");
            AssetStatus::Maintenance
        });
        Self {
            id: record.id,
            name: record.name,
            tag: record.tag,
            category: record.category,
            assignee: record.assignee,
            status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&Asset> for AssetRecord {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            tag: asset.tag.clone(),
            category: asset.category.clone(),
            assignee: asset.assignee.clone(),
            status: asset.status.to_string(),
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

impl From<UserRecord> for UserIdentity {
    fn from(record: UserRecord) -> Self {
        let role = Role::from_str(&record.role).unwrap_or_else(|_| {
            // Least privilege for roles this build does not know.
            warn!(id = %record.id, role = %record.role, "unknown role, treating as viewer");
            Role::Viewer
        });
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset_record(status: &str) -> AssetRecord {
        AssetRecord {
            id: "a1".into(),
            name: "Projector".into(),
            tag: None,
            category: None,
            assignee: None,
            status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn product_status_is_rederived() {
        let record = ProductRecord {
            id: "p1".into(),
            name: "Router".into(),
            sku: None,
            category: None,
            stock: 5,
            min_stock: 10,
            unit_price: 1.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let product = Product::from(record);
        assert_eq!(product.status, StockStatus::LowStock);
    }

    #[test]
    fn known_asset_status_round_trips() {
        let asset = Asset::from(asset_record("borrowed"));
        assert_eq!(asset.status, AssetStatus::Borrowed);
        assert_eq!(AssetRecord::from(&asset).status, "borrowed");
    }

    #[test]
    fn unknown_asset_status_parks_in_maintenance() {
        let asset = Asset::from(asset_record("exploded"));
        assert_eq!(asset.status, AssetStatus::Maintenance);
    }

    #[test]
    fn unknown_role_degrades_to_viewer() {
        let user = UserIdentity::from(UserRecord {
            id: "u1".into(),
            email: "a@b.com".into(),
            name: None,
            role: "wizard".into(),
        });
        assert_eq!(user.role, Role::Viewer);
    }
}
