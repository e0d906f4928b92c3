//! Job-related API endpoints

use crate::InferenceClient;
use crate::error::{ClientError, Result};
use synopsis_core::domain::job::{JobId, JobStatusReport};
use synopsis_core::domain::request::SummarizationRequest;
use synopsis_core::dto::job::{RunRequest, RunResponse, StatusResponse};
use tracing::debug;

impl InferenceClient {
    /// Submit a summarization job
    ///
    /// # Returns
    /// The identifier the service assigned to the job
    ///
    /// # Errors
    /// Transport failures, non-2xx responses, and bodies without an `id`.
    pub async fn submit_job(&self, request: &SummarizationRequest) -> Result<JobId> {
        let url = format!("{}/run", self.base_url);
        debug!("Submitting job ({} prompt bytes)", request.prompt().len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&RunRequest::from(request))
            .send()
            .await?;

        let body: RunResponse = self.handle_response(response).await?;
        match body.id {
            Some(id) if !id.is_empty() => Ok(JobId::new(id)),
            _ => Err(ClientError::MissingJobId(
                serde_json::to_string(&body).unwrap_or_default(),
            )),
        }
    }

    /// Get the classified status of a job
    ///
    /// # Errors
    /// Transport failures, non-2xx responses, unparseable bodies, and status
    /// strings outside the known vocabulary.
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatusReport> {
        let url = format!("{}/status/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let body: StatusResponse = self.handle_response(response).await?;
        Ok(body.classify()?)
    }
}
