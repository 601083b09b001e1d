use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;

use crate::application::ports::{TranscriptionService, TranscriptionServiceError};
use crate::domain::{TranscriptionDefinition, TranscriptionJob, TranscriptionJobId};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const TRANSCRIPTIONS_PATH: &str = "api/speechtotext/v2.0/transcriptions";

/// Client for the batch transcription REST API.
pub struct AzureSpeechClient {
    client: reqwest::Client,
    transcriptions_url: String,
    api_token: String,
}

impl AzureSpeechClient {
    pub fn new(base_uri: &str, api_token: &str) -> Self {
        let transcriptions_url =
            format!("{}/{}", base_uri.trim_end_matches('/'), TRANSCRIPTIONS_PATH);
        Self {
            client: reqwest::Client::new(),
            transcriptions_url,
            api_token: api_token.to_string(),
        }
    }

    pub fn transcriptions_url(&self) -> &str {
        &self.transcriptions_url
    }

    async fn error_from_response(response: reqwest::Response) -> TranscriptionServiceError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        TranscriptionServiceError::from_status(status, body)
    }
}

fn transport_error(e: reqwest::Error) -> TranscriptionServiceError {
    TranscriptionServiceError::Transient(format!("request: {}", e))
}

#[async_trait]
impl TranscriptionService for AzureSpeechClient {
    #[tracing::instrument(skip(self, definition), fields(name = %definition.name))]
    async fn submit(
        &self,
        definition: &TranscriptionDefinition,
    ) -> Result<Option<String>, TranscriptionServiceError> {
        let response = self
            .client
            .post(&self.transcriptions_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_token)
            .json(definition)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::ACCEPTED {
            tracing::warn!(status = %response.status(), "Transcription request not accepted");
            return Ok(None);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                TranscriptionServiceError::InvalidResponse("accepted without location".into())
            })?;

        Ok(Some(location))
    }

    #[tracing::instrument(skip(self))]
    async fn list_jobs(&self) -> Result<Vec<TranscriptionJob>, TranscriptionServiceError> {
        let response = self
            .client
            .get(&self.transcriptions_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_from_response(response).await);
        }

        let records: Vec<Value> = response.json().await.map_err(|e| {
            TranscriptionServiceError::InvalidResponse(format!("parse response: {}", e))
        })?;

        let total = records.len();
        let jobs: Vec<TranscriptionJob> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable transcription record");
                    None
                }
            })
            .collect();

        tracing::info!(total, parsed = jobs.len(), "Transcripts returned");
        Ok(jobs)
    }

    #[tracing::instrument(skip(self, url))]
    async fn fetch_result(&self, url: &str) -> Result<Bytes, TranscriptionServiceError> {
        let response = self
            .client
            .get(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_from_response(response).await);
        }

        response.bytes().await.map_err(transport_error)
    }

    #[tracing::instrument(skip(self), fields(job_id = %id))]
    async fn delete_job(&self, id: &TranscriptionJobId) -> Result<bool, TranscriptionServiceError> {
        let url = format!("{}/{}", self.transcriptions_url, id);
        let response = self
            .client
            .delete(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(true);
        }
        if status.is_success() {
            tracing::warn!(status = %status, "Unexpected delete response");
            return Ok(false);
        }
        Err(Self::error_from_response(response).await)
    }
}
