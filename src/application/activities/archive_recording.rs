use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::orchestration::{Activity, ActivityError, decode_input, encode_output};
use crate::application::ports::ObjectStoreGateway;
use crate::domain::{BlobPath, Namespace};

use super::ARCHIVE_RECORDING;

/// Moves a source recording into the processed-audio namespace.
///
/// The source is deleted only after the archive copy has been verified, so a
/// crash at any point leaves at least one intact copy.
pub struct ArchiveRecording {
    gateway: Arc<dyn ObjectStoreGateway>,
}

impl ArchiveRecording {
    pub fn new(gateway: Arc<dyn ObjectStoreGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Activity for ArchiveRecording {
    fn name(&self) -> &'static str {
        ARCHIVE_RECORDING
    }

    async fn execute(&self, input: Value) -> Result<Value, ActivityError> {
        let recording_url: String = decode_input(input)?;
        let source = BlobPath::recording_from_url(&recording_url).ok_or_else(|| {
            ActivityError::Rejected("recording url has no blob name".to_string())
        })?;
        let target = source.relocate(Namespace::ProcessedAudio);

        tracing::info!(source = %source, target = %target, "Archiving recording");

        match self.gateway.head(&source).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                // An earlier attempt may have finished the copy and delete.
                self.gateway.head(&target).await?;
                tracing::info!(target = %target, "Recording already archived");
                return encode_output(&true);
            }
            Err(e) => return Err(e.into()),
        }

        if !self.gateway.copy_then_verify(&source, &target).await? {
            return Err(ActivityError::Transient(format!(
                "archive copy of {} could not be verified",
                source
            )));
        }

        self.gateway.delete(&source).await?;

        tracing::info!(target = %target, "Recording archived");
        encode_output(&true)
    }
}
