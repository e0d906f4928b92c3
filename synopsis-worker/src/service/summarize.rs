//! Summarization service
//!
//! Runs one triggering event end to end:
//! - Parse the event into a source location
//! - Read the transcript
//! - Submit the summarization job
//! - Poll the job to a terminal state
//! - Extract the summary and write it next to the source
//!
//! Each step fails fast; the first error ends the run.

use std::sync::Arc;
use std::time::Duration;
use synopsis_core::domain::document::{
    ObjectLocation, SourceDocument, SummaryArtifact, summary_location,
};
use synopsis_core::domain::job::{Job, JobId, PollState};
use synopsis_core::domain::request::{GenerationParams, SummarizationRequest};
use synopsis_core::dto::event::parse_trigger;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{RunError, RunResult};
use crate::repository::{BlobError, BlobRepository, JobRepository};
use crate::scheduler::StatusPoller;

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
    pub job_id: JobId,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Orchestrates a single summarization run
pub struct SummarizationService {
    blobs: Arc<dyn BlobRepository>,
    jobs: Arc<dyn JobRepository>,
    poller: StatusPoller,
    output_prefix: String,
    output_bucket: Option<String>,
    generation: GenerationParams,
}

impl SummarizationService {
    /// Creates the service from resolved configuration
    pub fn new(
        config: &Config,
        blobs: Arc<dyn BlobRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        let poller = StatusPoller::new(
            Arc::clone(&jobs),
            config.max_poll_attempts,
            config.poll_interval,
        );

        Self {
            blobs,
            jobs,
            poller,
            output_prefix: config.output_prefix.clone(),
            output_bucket: config.output_bucket.clone(),
            generation: config.generation,
        }
    }

    /// Handles one raw trigger payload
    pub async fn handle_event(
        &self,
        payload: &str,
        cancel: &CancellationToken,
    ) -> RunResult<RunReport> {
        let source = parse_trigger(payload)?;
        let destination = self.destination_for(&source)?;
        info!("Processing {} -> {}", source, destination);

        let request = self.build_request(&source).await?;

        let job_id = self.jobs.submit(&request).await?;
        info!("Submitted job {}", job_id);
        drop(request);

        let outcome = self.poller.run(Job::submitted(job_id.clone()), cancel).await;
        let (attempts, elapsed) = (outcome.attempts, outcome.elapsed);

        if outcome.state() != PollState::Succeeded {
            warn!(
                "Job {} ended in {} after {} attempt(s)",
                job_id,
                outcome.state(),
                attempts
            );
            return Err(RunError::SummarizationFailed {
                job_id,
                state: outcome.job.state,
                detail: outcome.job.error.unwrap_or_default(),
                attempts,
                elapsed,
                cause: outcome.query_error,
            });
        }

        let summary = extract_summary(outcome.job.output.as_ref())?;
        info!("Generated summary of {} bytes", summary.len());

        let artifact = SummaryArtifact::new(destination, summary);

        self.blobs
            .put(
                &artifact.location,
                artifact.text.into_bytes(),
                SummaryArtifact::CONTENT_TYPE,
            )
            .await
            .map_err(|e| RunError::DestinationWrite {
                location: artifact.location.clone(),
                source: e,
            })?;
        info!("Summary stored at {}", artifact.location);

        Ok(RunReport {
            source,
            destination: artifact.location,
            job_id,
            attempts,
            elapsed,
        })
    }

    /// Resolves where the summary for `source` goes
    ///
    /// Refuses a destination that would overwrite the source itself.
    fn destination_for(&self, source: &ObjectLocation) -> RunResult<ObjectLocation> {
        let bucket = self
            .output_bucket
            .clone()
            .unwrap_or_else(|| source.bucket.clone());
        let location = summary_location(source, bucket, &self.output_prefix);

        if location == *source {
            return Err(RunError::DestinationWrite {
                source: BlobError::InvalidKey(location.clone()),
                location,
            });
        }
        Ok(location)
    }

    /// Reads the transcript and wraps it into a summarization request
    ///
    /// The document itself does not outlive this call.
    async fn build_request(&self, source: &ObjectLocation) -> RunResult<SummarizationRequest> {
        let text = self
            .blobs
            .get_text(source)
            .await
            .map_err(|e| RunError::SourceRead {
                location: source.clone(),
                source: e,
            })?;

        let document = SourceDocument::new(source.clone(), text);
        if document.is_blank() {
            return Err(RunError::EmptySource(source.clone()));
        }
        info!("Transcript size: {} bytes", document.byte_len());

        Ok(SummarizationRequest::from_document(&document, self.generation))
    }
}

/// Pulls the summary text out of a completed job's output
///
/// Accepts `{"text": "..."}` or a bare string.
fn extract_summary(output: Option<&serde_json::Value>) -> RunResult<String> {
    match output {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(serde_json::Value::Object(fields)) => match fields.get("text") {
            Some(serde_json::Value::String(text)) => Ok(text.clone()),
            Some(other) => Err(RunError::ResultParse(format!(
                "'text' field is not a string: {}",
                other
            ))),
            None => Err(RunError::ResultParse(format!(
                "output has no 'text' field: {}",
                serde_json::Value::Object(fields.clone())
            ))),
        },
        Some(other) => Err(RunError::ResultParse(format!(
            "unexpected output shape: {}",
            other
        ))),
        None => Err(RunError::ResultParse("job completed without output".into())),
    }
}
