// ── Persisted local mirror ──
//
// Key-value store backing offline operation: one JSON file per key under
// the data directory. Writes land in a temp file first and are renamed
// into place, so a crash mid-write never leaves a torn value. Each
// component is the sole writer of its own keys; there is no cross-process
// locking.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CoreError;

/// Well-known mirror keys.
pub const KEY_USER: &str = "user";
pub const KEY_TOKEN: &str = "auth-token";
pub const KEY_PRODUCTS: &str = "products";
pub const KEY_ASSETS: &str = "assets";
pub const KEY_NOTIFICATIONS: &str = "notifications";

/// File-backed JSON key-value store.
///
/// Cheap to clone; clones share the same directory.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    dir: PathBuf,
}

impl MirrorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read and deserialize a key. Missing key reads as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let path = self.path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::Mirror {
                    message: format!("failed to read {key}: {e}"),
                });
            }
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| CoreError::Mirror {
            message: format!("corrupt value for {key}: {e}"),
        })?;
        Ok(Some(value))
    }

    /// Read a list-valued key, treating a missing key as empty.
    pub async fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, CoreError> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    /// Serialize and persist a value under a key, atomically.
    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoreError::Mirror {
                message: format!("failed to create mirror dir: {e}"),
            })?;

        let bytes = serde_json::to_vec_pretty(value).map_err(|e| CoreError::Mirror {
            message: format!("failed to serialize {key}: {e}"),
        })?;

        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| CoreError::Mirror {
                message: format!("failed to write {key}: {e}"),
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CoreError::Mirror {
                message: format!("failed to commit {key}: {e}"),
            })?;

        debug!(key, "mirror updated");
        Ok(())
    }

    /// Remove a key. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), CoreError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Mirror {
                message: format!("failed to remove {key}: {e}"),
            }),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Product, ProductDraft};

    fn store() -> (tempfile::TempDir, MirrorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MirrorStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (_dir, store) = store();
        let value: Option<String> = store.get("nothing").await.unwrap();
        assert!(value.is_none());
        let list: Vec<Product> = store.get_list(KEY_PRODUCTS).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn round_trip() {
        let (_dir, store) = store();
        let product = Product::from_draft(ProductDraft {
            name: "Router".into(),
            stock: 3,
            min_stock: 1,
            ..ProductDraft::default()
        });

        store.put(KEY_PRODUCTS, &vec![product.clone()]).await.unwrap();
        let loaded: Vec<Product> = store.get_list(KEY_PRODUCTS).await.unwrap();
        assert_eq!(loaded, vec![product]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (_dir, store) = store();
        store.put(KEY_TOKEN, &"tok".to_string()).await.unwrap();
        store.remove(KEY_TOKEN).await.unwrap();
        store.remove(KEY_TOKEN).await.unwrap();
        let value: Option<String> = store.get(KEY_TOKEN).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn corrupt_value_surfaces_typed_error() {
        let (dir, store) = store();
        tokio::fs::create_dir_all(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("user.json"), b"{ not json")
            .await
            .unwrap();

        let result: Result<Option<String>, _> = store.get(KEY_USER).await;
        assert!(matches!(result, Err(CoreError::Mirror { .. })));
    }
}
