use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::ObjectStore;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use futures::TryStreamExt;

use scribeflow::application::ports::{ObjectStoreError, ObjectStoreGateway};
use scribeflow::domain::BlobPath;
use scribeflow::infrastructure::storage::{BaseUrlSigner, BlobGateway, NamespaceLayout};

/// Records the order of gateway calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Write(String),
    Copy(String, String),
    Delete(String),
}

/// Real in-memory gateway with switchable failures on chosen objects.
pub struct FaultyGateway {
    store: Arc<InMemory>,
    inner: BlobGateway,
    failing_deletes: Mutex<HashSet<String>>,
    failing_copies: Mutex<HashSet<String>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl FaultyGateway {
    pub fn new() -> Self {
        let store = Arc::new(InMemory::new());
        let signer = Arc::new(BaseUrlSigner::new(
            "https://account.blob.test",
            [("transcription_read".to_string(), std::time::Duration::from_secs(3600))]
                .into_iter()
                .collect(),
        ));
        let inner = BlobGateway::new(store.clone(), NamespaceLayout::default(), signer);
        Self {
            store,
            inner,
            failing_deletes: Mutex::new(HashSet::new()),
            failing_copies: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn put(&self, path: &BlobPath, data: &str) {
        self.inner
            .write(path, Bytes::from(data.to_string()))
            .await
            .unwrap();
    }

    pub async fn exists(&self, path: &BlobPath) -> bool {
        self.inner.head(path).await.is_ok()
    }

    pub async fn read_string(&self, path: &BlobPath) -> String {
        let bytes = self.inner.read(path).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn count_objects(&self, prefix: &str) -> usize {
        let prefix = StorePath::from(prefix);
        let objects: Vec<_> = self
            .store
            .list(Some(&prefix))
            .try_collect()
            .await
            .unwrap();
        objects.len()
    }

    pub fn fail_delete(&self, path: &BlobPath, failing: bool) {
        let mut set = self.failing_deletes.lock().unwrap();
        if failing {
            set.insert(path.to_string());
        } else {
            set.remove(&path.to_string());
        }
    }

    pub fn fail_copy(&self, path: &BlobPath) {
        self.failing_copies.lock().unwrap().insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStoreGateway for FaultyGateway {
    async fn read(&self, path: &BlobPath) -> Result<Bytes, ObjectStoreError> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &BlobPath, data: Bytes) -> Result<u64, ObjectStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Write(path.to_string()));
        self.inner.write(path, data).await
    }

    async fn head(&self, path: &BlobPath) -> Result<u64, ObjectStoreError> {
        self.inner.head(path).await
    }

    async fn copy_then_verify(
        &self,
        source: &BlobPath,
        dest: &BlobPath,
    ) -> Result<bool, ObjectStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Copy(source.to_string(), dest.to_string()));
        if self.failing_copies.lock().unwrap().contains(&source.to_string()) {
            return Err(ObjectStoreError::CopyFailed(source.to_string()));
        }
        self.inner.copy_then_verify(source, dest).await
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), ObjectStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Delete(path.to_string()));
        if self.failing_deletes.lock().unwrap().contains(&path.to_string()) {
            return Err(ObjectStoreError::DeleteFailed(path.to_string()));
        }
        self.inner.delete(path).await
    }

    async fn sign_scoped_url(
        &self,
        path: &BlobPath,
        policy: &str,
    ) -> Result<String, ObjectStoreError> {
        self.inner.sign_scoped_url(path, policy).await
    }
}
