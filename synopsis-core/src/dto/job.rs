//! Inference service DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobStatusReport, UnrecognizedStatus};
use crate::domain::request::SummarizationRequest;

/// Body of `POST /run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub input: RunInput,
}

/// Model input carried by a [`RunRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&SummarizationRequest> for RunRequest {
    fn from(request: &SummarizationRequest) -> Self {
        let params = request.params();
        Self {
            input: RunInput {
                prompt: request.prompt().to_string(),
                max_tokens: params.max_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
            },
        }
    }
}

/// Response of `POST /run`
///
/// Every field is optional so a body without an `id` can be reported
/// precisely instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `GET /status/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl StatusResponse {
    /// Classifies the raw response against the known status vocabulary
    pub fn classify(self) -> Result<JobStatusReport, UnrecognizedStatus> {
        let status = self.status.parse()?;
        let error = self.error.and_then(|value| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(message) => Some(message),
            other => Some(other.to_string()),
        });

        Ok(JobStatusReport {
            status,
            output: self.output,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{ObjectLocation, SourceDocument};
    use crate::domain::job::JobStatus;
    use crate::domain::request::GenerationParams;
    use serde_json::json;

    #[test]
    fn test_run_request_shape() {
        let doc = SourceDocument::new(ObjectLocation::new("in", "a.txt"), "hello".into());
        let request = SummarizationRequest::from_document(&doc, GenerationParams::default());
        let body = serde_json::to_value(RunRequest::from(&request)).unwrap();

        assert_eq!(body["input"]["max_tokens"], json!(6000));
        assert_eq!(body["input"]["temperature"], json!(0.5));
        assert!(body["input"]["prompt"].as_str().unwrap().contains("hello"));
        assert!(body["input"]["top_p"].as_f64().unwrap() > 0.89);
    }

    #[test]
    fn test_run_response_without_id() {
        let response: RunResponse = serde_json::from_value(json!({ "status": "IN_QUEUE" })).unwrap();
        assert!(response.id.is_none());
    }

    #[test]
    fn test_classify_completed() {
        let response: StatusResponse = serde_json::from_value(json!({
            "id": "J1",
            "status": "COMPLETED",
            "output": { "text": "SUMMARY" }
        }))
        .unwrap();

        let report = response.classify().unwrap();
        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.output, Some(json!({ "text": "SUMMARY" })));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_classify_structured_error() {
        let response: StatusResponse = serde_json::from_value(json!({
            "status": "FAILED",
            "error": { "code": 500 }
        }))
        .unwrap();

        let report = response.classify().unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.error.as_deref(), Some(r#"{"code":500}"#));
    }

    #[test]
    fn test_classify_missing_status_is_unrecognized() {
        let response: StatusResponse = serde_json::from_value(json!({ "id": "J1" })).unwrap();
        assert_eq!(response.classify(), Err(UnrecognizedStatus(String::new())));
    }

    #[test]
    fn test_classify_unknown_status() {
        let response: StatusResponse =
            serde_json::from_value(json!({ "status": "PAUSED" })).unwrap();
        assert_eq!(response.classify(), Err(UnrecognizedStatus("PAUSED".into())));
    }
}
