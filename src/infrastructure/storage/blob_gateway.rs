use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{ObjectStoreError, ObjectStoreGateway, ScopedUrlSigner};
use crate::domain::{BlobPath, Namespace};

use super::url_signer::ObjectStoreUrlSigner;

/// Prefix under which each namespace lives inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceLayout {
    pub recordings: String,
    pub transcripts: String,
    pub processed_audio: String,
}

impl NamespaceLayout {
    pub fn prefix(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Recordings => &self.recordings,
            Namespace::Transcripts => &self.transcripts,
            Namespace::ProcessedAudio => &self.processed_audio,
        }
    }

    pub fn resolve(&self, path: &BlobPath) -> StorePath {
        let prefix = self.prefix(path.namespace()).trim_matches('/');
        if prefix.is_empty() {
            StorePath::from(path.name())
        } else {
            StorePath::from(format!("{}/{}", prefix, path.name()))
        }
    }
}

impl Default for NamespaceLayout {
    fn default() -> Self {
        Self {
            recordings: Namespace::Recordings.as_str().to_string(),
            transcripts: Namespace::Transcripts.as_str().to_string(),
            processed_audio: Namespace::ProcessedAudio.as_str().to_string(),
        }
    }
}

/// `ObjectStoreGateway` over any `object_store` backend.
pub struct BlobGateway {
    inner: Arc<dyn ObjectStore>,
    layout: NamespaceLayout,
    signer: Arc<dyn ScopedUrlSigner>,
}

impl BlobGateway {
    pub fn new(
        inner: Arc<dyn ObjectStore>,
        layout: NamespaceLayout,
        signer: Arc<dyn ScopedUrlSigner>,
    ) -> Self {
        Self {
            inner,
            layout,
            signer,
        }
    }

    /// Azure container; scoped URLs are SAS URLs issued by the store itself.
    pub fn azure(
        account: &str,
        access_key: &str,
        container: &str,
        layout: NamespaceLayout,
        policies: std::collections::HashMap<String, std::time::Duration>,
    ) -> Result<Self, ObjectStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| ObjectStoreError::Configuration(e.to_string()))?;

        let store = Arc::new(store);
        let signer = Arc::new(ObjectStoreUrlSigner::new(store.clone(), policies));
        Ok(Self::new(store, layout, signer))
    }

    pub fn local(
        base_path: PathBuf,
        layout: NamespaceLayout,
        signer: Arc<dyn ScopedUrlSigner>,
    ) -> Result<Self, ObjectStoreError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| ObjectStoreError::Configuration(e.to_string()))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| ObjectStoreError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(fs), layout, signer))
    }

    pub fn in_memory(layout: NamespaceLayout, signer: Arc<dyn ScopedUrlSigner>) -> Self {
        Self::new(Arc::new(InMemory::new()), layout, signer)
    }

    pub fn layout(&self) -> &NamespaceLayout {
        &self.layout
    }
}

fn map_error(e: object_store::Error, otherwise: fn(String) -> ObjectStoreError) -> ObjectStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => ObjectStoreError::NotFound(path),
        other => otherwise(other.to_string()),
    }
}

#[async_trait]
impl ObjectStoreGateway for BlobGateway {
    async fn read(&self, path: &BlobPath) -> Result<Bytes, ObjectStoreError> {
        let store_path = self.layout.resolve(path);
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| map_error(e, ObjectStoreError::ReadFailed))?;

        result
            .bytes()
            .await
            .map_err(|e| map_error(e, ObjectStoreError::ReadFailed))
    }

    #[tracing::instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    async fn write(&self, path: &BlobPath, data: Bytes) -> Result<u64, ObjectStoreError> {
        let store_path = self.layout.resolve(path);
        let size = data.len() as u64;
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| map_error(e, ObjectStoreError::WriteFailed))?;
        Ok(size)
    }

    async fn head(&self, path: &BlobPath) -> Result<u64, ObjectStoreError> {
        let store_path = self.layout.resolve(path);
        let meta = self
            .inner
            .head(&store_path)
            .await
            .map_err(|e| map_error(e, ObjectStoreError::ReadFailed))?;
        Ok(meta.size as u64)
    }

    #[tracing::instrument(skip(self), fields(source = %source, dest = %dest))]
    async fn copy_then_verify(
        &self,
        source: &BlobPath,
        dest: &BlobPath,
    ) -> Result<bool, ObjectStoreError> {
        let from = self.layout.resolve(source);
        let to = self.layout.resolve(dest);

        let expected = self
            .inner
            .head(&from)
            .await
            .map_err(|e| map_error(e, ObjectStoreError::ReadFailed))?;

        self.inner
            .copy(&from, &to)
            .await
            .map_err(|e| map_error(e, ObjectStoreError::CopyFailed))?;

        let copied = match self.inner.head(&to).await {
            Ok(meta) => meta,
            Err(object_store::Error::NotFound { .. }) => {
                tracing::warn!("Copy reported success but destination is missing");
                return Ok(false);
            }
            Err(e) => return Err(ObjectStoreError::ReadFailed(e.to_string())),
        };

        if copied.size != expected.size {
            tracing::warn!(
                expected = expected.size,
                actual = copied.size,
                "Copied object size mismatch"
            );
            return Ok(false);
        }

        Ok(true)
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &BlobPath) -> Result<(), ObjectStoreError> {
        let store_path = self.layout.resolve(path);
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| map_error(e, ObjectStoreError::DeleteFailed))
    }

    async fn sign_scoped_url(
        &self,
        path: &BlobPath,
        policy: &str,
    ) -> Result<String, ObjectStoreError> {
        let store_path = self.layout.resolve(path);
        let url = self.signer.sign(store_path.as_ref(), policy).await?;
        tracing::debug!(path = %path, policy, "Signed scoped url");
        Ok(url)
    }
}
