use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::orchestration::RetryPolicy;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub speech: SpeechSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSettings {
    pub base_uri: String,
    pub api_token: String,
    pub locale: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Azure,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub public_base_url: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
    pub recordings_prefix: String,
    pub transcripts_prefix: String,
    pub processed_audio_prefix: String,
    /// Access policy used when signing recording URLs for submission.
    pub policy_name: String,
    /// Lifetime in seconds of each named access policy.
    pub policies: HashMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Extra connection attempts at startup before giving up.
    pub connect_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub connect_backoff_ms: u64,
    /// Finished runs kept by the in-memory history store.
    pub in_memory_retention: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl PipelineSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Layers defaults, `appsettings.{environment}.toml` and `APP_*`
    /// environment variables, in that order.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = format!("appsettings.{}", environment.as_str().to_lowercase());

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("speech.base_uri", "http://localhost:8080")?
            .set_default("speech.api_token", "")?
            .set_default("speech.locale", "en-US")?
            .set_default("speech.description", "recording transcription")?
            .set_default("storage.provider", "local")?
            .set_default("storage.local_path", "./data")?
            .set_default("storage.public_base_url", "http://localhost:3000/blobs")?
            .set_default("storage.recordings_prefix", "recordings")?
            .set_default("storage.transcripts_prefix", "transcripts")?
            .set_default("storage.processed_audio_prefix", "processed_audio")?
            .set_default("storage.policy_name", "transcription_read")?
            .set_default("storage.policies.transcription_read", 86_400)?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("database.connect_retries", 5)?
            .set_default("database.connect_backoff_ms", 500)?
            .set_default("database.in_memory_retention", 1_000)?
            .set_default("pipeline.poll_interval_secs", 5)?
            .set_default("pipeline.max_attempts", 3)?
            .set_default("pipeline.initial_backoff_ms", 500)?
            .set_default("pipeline.max_backoff_ms", 5_000)?
            .set_default("logging.level", "info,scribeflow=debug,tower_http=debug")?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
