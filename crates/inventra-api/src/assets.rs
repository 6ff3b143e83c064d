// Asset endpoints
//
// CRUD on `/api/assets`. Borrow/return are plain record updates remotely;
// the state-machine guards live in the entity manager, which only sends a
// request after the transition has been validated locally.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::AssetRecord;

impl ApiClient {
    /// List all assets.
    ///
    /// `GET /api/assets`
    pub async fn list_assets(&self) -> Result<Vec<AssetRecord>, Error> {
        debug!("listing assets");
        self.get("assets").await
    }

    /// Create an asset.
    ///
    /// `POST /api/assets`
    pub async fn create_asset(&self, record: &AssetRecord) -> Result<AssetRecord, Error> {
        debug!(id = %record.id, name = %record.name, "creating asset");
        self.post("assets", record).await
    }

    /// Replace an asset.
    ///
    /// `PUT /api/assets/{id}`
    pub async fn update_asset(&self, record: &AssetRecord) -> Result<AssetRecord, Error> {
        debug!(id = %record.id, status = %record.status, "updating asset");
        self.put(&format!("assets/{}", record.id), record).await
    }

    /// Delete an asset.
    ///
    /// `DELETE /api/assets/{id}`
    pub async fn delete_asset(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting asset");
        self.delete(&format!("assets/{id}")).await
    }
}
