mod archive_recording;
mod delete_remote_job;
mod fetch_and_store_transcript;
mod list_complete_jobs;

use std::sync::Arc;

pub use archive_recording::ArchiveRecording;
pub use delete_remote_job::DeleteRemoteJob;
pub use fetch_and_store_transcript::FetchAndStoreTranscript;
pub use list_complete_jobs::ListCompleteJobs;

use crate::application::orchestration::{ActivityExecutor, RetryPolicy};
use crate::application::ports::{ObjectStoreGateway, TranscriptionService};

pub const LIST_COMPLETE_JOBS: &str = "ListCompleteJobs";
pub const FETCH_AND_STORE_TRANSCRIPT: &str = "FetchAndStoreTranscript";
pub const ARCHIVE_RECORDING: &str = "ArchiveRecording";
pub const DELETE_REMOTE_JOB: &str = "DeleteRemoteJob";

/// Executor with every activity the transcription pipeline calls.
pub fn pipeline_executor(
    service: Arc<dyn TranscriptionService>,
    gateway: Arc<dyn ObjectStoreGateway>,
    retry_policy: RetryPolicy,
) -> ActivityExecutor {
    ActivityExecutor::new(retry_policy)
        .register(Arc::new(ListCompleteJobs::new(Arc::clone(&service))))
        .register(Arc::new(FetchAndStoreTranscript::new(
            Arc::clone(&service),
            Arc::clone(&gateway),
        )))
        .register(Arc::new(ArchiveRecording::new(gateway)))
        .register(Arc::new(DeleteRemoteJob::new(service)))
}
