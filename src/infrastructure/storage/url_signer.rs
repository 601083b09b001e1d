use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use object_store::path::Path as StorePath;
use object_store::signer::Signer;
use reqwest::Method;

use crate::application::ports::{ScopedUrlSigner, SigningError};

fn policy_ttl(
    policies: &HashMap<String, Duration>,
    policy: &str,
) -> Result<Duration, SigningError> {
    policies
        .get(policy)
        .copied()
        .ok_or_else(|| SigningError::UnknownPolicy(policy.to_string()))
}

/// Read-only URLs signed by the backing store, expiring after the named
/// policy's lifetime.
pub struct ObjectStoreUrlSigner {
    signer: Arc<dyn Signer>,
    policies: HashMap<String, Duration>,
}

impl ObjectStoreUrlSigner {
    pub fn new(signer: Arc<dyn Signer>, policies: HashMap<String, Duration>) -> Self {
        Self { signer, policies }
    }
}

#[async_trait]
impl ScopedUrlSigner for ObjectStoreUrlSigner {
    async fn sign(&self, location: &str, policy: &str) -> Result<String, SigningError> {
        let ttl = policy_ttl(&self.policies, policy)?;
        let url = self
            .signer
            .signed_url(Method::GET, &StorePath::from(location), ttl)
            .await
            .map_err(|e| SigningError::Failed(e.to_string()))?;
        Ok(url.to_string())
    }
}

/// Unsigned URLs under a fixed base, tagged with policy and lifetime. For
/// stores that are served by a trusted local endpoint.
pub struct BaseUrlSigner {
    base_url: String,
    policies: HashMap<String, Duration>,
}

impl BaseUrlSigner {
    pub fn new(base_url: &str, policies: HashMap<String, Duration>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            policies,
        }
    }
}

#[async_trait]
impl ScopedUrlSigner for BaseUrlSigner {
    async fn sign(&self, location: &str, policy: &str) -> Result<String, SigningError> {
        let ttl = policy_ttl(&self.policies, policy)?;
        Ok(format!(
            "{}/{}?policy={}&expires_in={}",
            self.base_url,
            location.trim_start_matches('/'),
            policy,
            ttl.as_secs()
        ))
    }
}
