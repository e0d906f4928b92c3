//! Jobs repository
//!
//! Handles communication with the inference service:
//! - Submitting summarization jobs
//! - Querying job status

use async_trait::async_trait;
use synopsis_client::{ClientError, InferenceClient};
use synopsis_core::domain::job::{JobId, JobStatusReport};
use synopsis_core::domain::request::SummarizationRequest;
use thiserror::Error;

/// Submitting a job failed
#[derive(Debug, Error)]
#[error("job submission failed: {0}")]
pub struct SubmissionError(#[source] pub ClientError);

/// Querying a job's status failed, or the status was not understood
#[derive(Debug, Error)]
#[error("status query for job {job_id} failed: {source}")]
pub struct StatusQueryError {
    pub job_id: JobId,
    #[source]
    pub source: ClientError,
}

/// Repository trait for inference job operations
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Submits a summarization job
    ///
    /// # Returns
    /// The identifier assigned by the service
    async fn submit(&self, request: &SummarizationRequest) -> Result<JobId, SubmissionError>;

    /// Fetches and classifies the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The job to query
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusReport, StatusQueryError>;
}

/// HTTP implementation of JobRepository
pub struct HttpJobRepository {
    client: InferenceClient,
}

impl HttpJobRepository {
    /// Creates a new HTTP job repository
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn submit(&self, request: &SummarizationRequest) -> Result<JobId, SubmissionError> {
        self.client.submit_job(request).await.map_err(SubmissionError)
    }

    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusReport, StatusQueryError> {
        self.client
            .job_status(job_id)
            .await
            .map_err(|source| StatusQueryError {
                job_id: job_id.clone(),
                source,
            })
    }
}
