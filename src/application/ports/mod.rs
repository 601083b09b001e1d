mod history_store;
mod object_store_gateway;
mod transcription_service;

pub use history_store::{HistoryStore, HistoryStoreError};
pub use object_store_gateway::{ObjectStoreError, ObjectStoreGateway, ScopedUrlSigner, SigningError};
pub use transcription_service::{TranscriptionService, TranscriptionServiceError};
