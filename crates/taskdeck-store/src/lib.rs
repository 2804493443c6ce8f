mod local;

pub use local::LocalStore;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A store for opaque blobs keyed by string paths. Uploaded task
/// attachments are written here before the task row references them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Delete an object. No-op if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self.get(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Key under which one upload lives: `uploads/{upload_id}/{filename}`.
pub fn upload_key(upload_id: &str, filename: &str) -> String {
    format!("uploads/{upload_id}/{filename}")
}

/// Configuration for the object store backend.
pub struct StoreConfig {
    /// Filesystem base directory for stored uploads.
    pub local_data_dir: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            local_data_dir: std::env::var("TASKDECK_UPLOAD_DIR").ok(),
        }
    }
}

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    Ok(Arc::new(LocalStore::new(config)))
}
