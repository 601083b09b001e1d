use async_trait::async_trait;

use crate::application::activities::{
    ARCHIVE_RECORDING, DELETE_REMOTE_JOB, FETCH_AND_STORE_TRANSCRIPT, LIST_COMPLETE_JOBS,
};
use crate::application::orchestration::{Orchestration, OrchestrationContext, OrchestrationError};
use crate::domain::{InstanceId, TranscriptionJob};

pub const PIPELINE_NAME: &str = "transcription_pipeline";

/// Where a job ended up after one pass of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobProgress {
    Retired,
    /// Left for a future run; the named step did not succeed.
    Deferred(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub polled: usize,
    pub processed: usize,
    pub deferred: usize,
}

/// Poll for finished transcriptions, then fetch, archive and retire each one.
///
/// Jobs are handled one at a time. A failed step only affects its own job:
/// later steps for that job are skipped and the loop moves on.
pub struct TranscriptionPipeline;

impl TranscriptionPipeline {
    async fn process_job(
        &self,
        ctx: &mut OrchestrationContext,
        job: &TranscriptionJob,
    ) -> Result<JobProgress, OrchestrationError> {
        let stored: Option<String> = match ctx.call_activity(FETCH_AND_STORE_TRANSCRIPT, job).await? {
            Ok(location) => Some(location),
            Err(failure) => {
                tracing::warn!(job_id = %job.id, error = %failure, "Transcript not stored");
                None
            }
        };
        if stored.is_none() {
            return Ok(JobProgress::Deferred(FETCH_AND_STORE_TRANSCRIPT));
        }

        let archived = match ctx
            .call_activity::<_, bool>(ARCHIVE_RECORDING, &job.recording_url)
            .await?
        {
            Ok(archived) => archived,
            Err(failure) => {
                tracing::warn!(job_id = %job.id, error = %failure, "Recording not archived");
                false
            }
        };
        if !archived {
            return Ok(JobProgress::Deferred(ARCHIVE_RECORDING));
        }

        match ctx
            .call_activity::<_, bool>(DELETE_REMOTE_JOB, &job.id)
            .await?
        {
            Ok(true) => Ok(JobProgress::Retired),
            Ok(false) => Ok(JobProgress::Deferred(DELETE_REMOTE_JOB)),
            Err(failure) => {
                tracing::warn!(job_id = %job.id, error = %failure, "Remote job not retired");
                Ok(JobProgress::Deferred(DELETE_REMOTE_JOB))
            }
        }
    }
}

#[async_trait]
impl Orchestration for TranscriptionPipeline {
    type Output = InstanceId;

    fn name(&self) -> &str {
        PIPELINE_NAME
    }

    async fn run(&self, ctx: &mut OrchestrationContext) -> Result<InstanceId, OrchestrationError> {
        // A failed listing is an empty poll; the next trigger will try again.
        let jobs: Vec<TranscriptionJob> = match ctx.call_activity(LIST_COMPLETE_JOBS, &()).await? {
            Ok(jobs) => jobs,
            Err(failure) => {
                tracing::warn!(error = %failure, "Polling for complete transcriptions failed");
                Vec::new()
            }
        };

        let mut summary = PipelineSummary {
            polled: jobs.len(),
            ..PipelineSummary::default()
        };

        for job in &jobs {
            match self.process_job(ctx, job).await? {
                JobProgress::Retired => summary.processed += 1,
                JobProgress::Deferred(step) => {
                    tracing::info!(job_id = %job.id, step, "Job deferred to a future run");
                    summary.deferred += 1;
                }
            }
        }

        tracing::info!(
            polled = summary.polled,
            processed = summary.processed,
            retried = ctx.stats().retries,
            deferred = summary.deferred,
            "Pipeline run summary"
        );

        Ok(ctx.instance_id())
    }
}
