use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::BlobPath;

#[async_trait]
pub trait ObjectStoreGateway: Send + Sync {
    async fn read(&self, path: &BlobPath) -> Result<Bytes, ObjectStoreError>;

    /// Writes the object, replacing any previous content under the same path.
    async fn write(&self, path: &BlobPath, data: Bytes) -> Result<u64, ObjectStoreError>;

    /// Returns the object's size, or `NotFound`.
    async fn head(&self, path: &BlobPath) -> Result<u64, ObjectStoreError>;

    /// Copies `source` to `dest` and confirms that the destination exists with
    /// the source's size. `Ok(false)` means the copy could not be verified.
    async fn copy_then_verify(
        &self,
        source: &BlobPath,
        dest: &BlobPath,
    ) -> Result<bool, ObjectStoreError>;

    async fn delete(&self, path: &BlobPath) -> Result<(), ObjectStoreError>;

    async fn sign_scoped_url(&self, path: &BlobPath, policy: &str)
    -> Result<String, ObjectStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("copy failed: {0}")]
    CopyFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ObjectStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ObjectStoreError::NotFound(_))
    }
}

/// Issues time-limited URLs granting access to a single object.
#[async_trait]
pub trait ScopedUrlSigner: Send + Sync {
    async fn sign(&self, location: &str, policy: &str) -> Result<String, SigningError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("unknown access policy: {0}")]
    UnknownPolicy(String),
    #[error("signing failed: {0}")]
    Failed(String),
}
