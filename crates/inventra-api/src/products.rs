// Product endpoints
//
// CRUD on `/api/products`. Create and update take full records: the caller
// (entity manager) constructs the record locally -- id and timestamps
// included -- so a confirmed remote write can be mirrored byte-for-byte.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::ProductRecord;

impl ApiClient {
    /// List all products.
    ///
    /// `GET /api/products`
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, Error> {
        debug!("listing products");
        self.get("products").await
    }

    /// Create a product.
    ///
    /// `POST /api/products`
    pub async fn create_product(&self, record: &ProductRecord) -> Result<ProductRecord, Error> {
        debug!(id = %record.id, name = %record.name, "creating product");
        self.post("products", record).await
    }

    /// Replace a product.
    ///
    /// `PUT /api/products/{id}`
    pub async fn update_product(&self, record: &ProductRecord) -> Result<ProductRecord, Error> {
        debug!(id = %record.id, "updating product");
        self.put(&format!("products/{}", record.id), record).await
    }

    /// Delete a product.
    ///
    /// `DELETE /api/products/{id}`
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting product");
        self.delete(&format!("products/{id}")).await
    }
}
