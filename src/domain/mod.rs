mod blob_path;
mod history_event;
mod instance_id;
mod orchestration_run;
mod transcription_definition;
mod transcription_job;
mod transcription_status;

pub use blob_path::{BlobPath, Namespace};
pub use history_event::{ActivityOutcome, HistoryEvent, hash_input};
pub use instance_id::InstanceId;
pub use orchestration_run::{OrchestrationRun, RunStatus};
pub use transcription_definition::{ModelIdentity, TranscriptionDefinition};
pub use transcription_job::{TranscriptionJob, TranscriptionJobId};
pub use transcription_status::TranscriptionStatus;
