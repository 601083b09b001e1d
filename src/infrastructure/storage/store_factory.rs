use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ObjectStoreError, ObjectStoreGateway};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::blob_gateway::{BlobGateway, NamespaceLayout};
use super::url_signer::BaseUrlSigner;

pub struct ObjectStoreGatewayFactory;

impl ObjectStoreGatewayFactory {
    pub fn create(
        settings: &StorageSettings,
    ) -> Result<Arc<dyn ObjectStoreGateway>, ObjectStoreError> {
        let layout = NamespaceLayout {
            recordings: settings.recordings_prefix.clone(),
            transcripts: settings.transcripts_prefix.clone(),
            processed_audio: settings.processed_audio_prefix.clone(),
        };
        let policies: HashMap<String, Duration> = settings
            .policies
            .iter()
            .map(|(name, secs)| (name.clone(), Duration::from_secs(*secs)))
            .collect();

        match settings.provider {
            StorageProviderSetting::Local => {
                let signer = Arc::new(BaseUrlSigner::new(&settings.public_base_url, policies));
                let gateway =
                    BlobGateway::local(PathBuf::from(&settings.local_path), layout, signer)?;
                Ok(Arc::new(gateway))
            }
            StorageProviderSetting::Memory => {
                let signer = Arc::new(BaseUrlSigner::new(&settings.public_base_url, policies));
                Ok(Arc::new(BlobGateway::in_memory(layout, signer)))
            }
            StorageProviderSetting::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    ObjectStoreError::Configuration("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    ObjectStoreError::Configuration("azure_access_key required".into())
                })?;
                let container = settings.azure_container.as_deref().ok_or_else(|| {
                    ObjectStoreError::Configuration("azure_container required".into())
                })?;
                let gateway = BlobGateway::azure(account, key, container, layout, policies)?;
                Ok(Arc::new(gateway))
            }
        }
    }
}
