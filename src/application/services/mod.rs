mod pipeline_scheduler;
mod recording_submission;
mod transcription_pipeline;

pub use pipeline_scheduler::PipelineScheduler;
pub use recording_submission::{RecordingSubmissionService, SubmissionError, SubmissionSettings};
pub use transcription_pipeline::{JobProgress, PIPELINE_NAME, PipelineSummary, TranscriptionPipeline};
