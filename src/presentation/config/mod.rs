mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LoggingSettings, PipelineSettings, ServerSettings, Settings, SpeechSettings,
    StorageProviderSetting, StorageSettings,
};
