//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque job identifier assigned by the inference service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the inference service
///
/// This is the complete vocabulary the service is known to emit. Anything
/// else fails to parse with [`UnrecognizedStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InQueue,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

/// Coarse classification of a [`JobStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InQueue => "IN_QUEUE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::TimedOut => "TIMED_OUT",
        }
    }

    pub fn class(&self) -> StatusClass {
        match self {
            JobStatus::InQueue | JobStatus::InProgress => StatusClass::Running,
            JobStatus::Completed => StatusClass::Succeeded,
            JobStatus::Failed | JobStatus::Cancelled | JobStatus::TimedOut => StatusClass::Failed,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the known vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized job status '{0}'")]
pub struct UnrecognizedStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnrecognizedStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_QUEUE" => Ok(JobStatus::InQueue),
            "IN_PROGRESS" => Ok(JobStatus::InProgress),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            "CANCELLED" => Ok(JobStatus::Cancelled),
            "TIMED_OUT" => Ok(JobStatus::TimedOut),
            other => Err(UnrecognizedStatus(other.to_string())),
        }
    }
}

/// One classified answer from the status endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Result payload, only meaningful when the job completed
    pub output: Option<serde_json::Value>,
    /// Error detail, only meaningful when the job failed
    pub error: Option<String>,
}

/// Local view of a job's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollState {
    Submitted,
    InProgress,
    Succeeded,
    Failed,
    TimedOut,
    Errored,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Succeeded | PollState::Failed | PollState::TimedOut | PollState::Errored
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Submitted => "SUBMITTED",
            PollState::InProgress => "IN_PROGRESS",
            PollState::Succeeded => "SUCCEEDED",
            PollState::Failed => "FAILED",
            PollState::TimedOut => "TIMED_OUT",
            PollState::Errored => "ERRORED",
        }
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted job, owned by the run that created it
///
/// State only moves forward: once terminal, further observations are ignored.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub state: PollState,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    /// Present only once the job has succeeded
    pub output: Option<serde_json::Value>,
    /// Present only once the job has failed, errored or timed out
    pub error: Option<String>,
}

impl Job {
    pub fn submitted(id: JobId) -> Self {
        Self {
            id,
            state: PollState::Submitted,
            submitted_at: chrono::Utc::now(),
            output: None,
            error: None,
        }
    }

    /// Wall time since submission
    pub fn age(&self) -> chrono::TimeDelta {
        chrono::Utc::now() - self.submitted_at
    }

    /// Folds a status report into the job, returning the resulting state
    pub fn observe(&mut self, report: JobStatusReport) -> PollState {
        if self.state.is_terminal() {
            return self.state;
        }

        match report.status.class() {
            StatusClass::Running => self.state = PollState::InProgress,
            StatusClass::Succeeded => {
                self.state = PollState::Succeeded;
                self.output = report.output;
            }
            StatusClass::Failed => {
                self.state = PollState::Failed;
                self.error = Some(
                    report
                        .error
                        .unwrap_or_else(|| format!("job ended with status {}", report.status)),
                );
            }
        }

        self.state
    }

    /// Moves a non-terminal job into `TIMED_OUT` or `ERRORED`
    pub fn abandon(&mut self, state: PollState, detail: impl Into<String>) -> PollState {
        debug_assert!(matches!(state, PollState::TimedOut | PollState::Errored));
        if !self.state.is_terminal() {
            self.state = state;
            self.error = Some(detail.into());
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: JobStatus) -> JobStatusReport {
        JobStatusReport {
            status,
            output: None,
            error: None,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("IN_QUEUE".parse::<JobStatus>(), Ok(JobStatus::InQueue));
        assert_eq!("COMPLETED".parse::<JobStatus>(), Ok(JobStatus::Completed));
        assert_eq!("TIMED_OUT".parse::<JobStatus>(), Ok(JobStatus::TimedOut));
        assert_eq!(
            "completed".parse::<JobStatus>(),
            Err(UnrecognizedStatus("completed".to_string()))
        );
        assert!("".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(JobStatus::InQueue.class(), StatusClass::Running);
        assert_eq!(JobStatus::InProgress.class(), StatusClass::Running);
        assert_eq!(JobStatus::Completed.class(), StatusClass::Succeeded);
        assert_eq!(JobStatus::Failed.class(), StatusClass::Failed);
        assert_eq!(JobStatus::Cancelled.class(), StatusClass::Failed);
        assert_eq!(JobStatus::TimedOut.class(), StatusClass::Failed);
    }

    #[test]
    fn test_job_success_captures_output() {
        let mut job = Job::submitted(JobId::new("J1"));
        assert_eq!(job.observe(report(JobStatus::InQueue)), PollState::InProgress);

        let state = job.observe(JobStatusReport {
            status: JobStatus::Completed,
            output: Some(serde_json::json!({ "text": "SUMMARY" })),
            error: None,
        });

        assert_eq!(state, PollState::Succeeded);
        assert_eq!(job.output, Some(serde_json::json!({ "text": "SUMMARY" })));
        assert!(job.error.is_none());
    }

    #[test]
    fn test_job_failure_keeps_remote_detail() {
        let mut job = Job::submitted(JobId::new("J1"));
        job.observe(JobStatusReport {
            status: JobStatus::Failed,
            output: None,
            error: Some("CUDA out of memory".into()),
        });
        assert_eq!(job.state, PollState::Failed);
        assert_eq!(job.error.as_deref(), Some("CUDA out of memory"));
    }

    #[test]
    fn test_job_failure_without_detail() {
        let mut job = Job::submitted(JobId::new("J1"));
        job.observe(report(JobStatus::Cancelled));
        assert_eq!(job.error.as_deref(), Some("job ended with status CANCELLED"));
    }

    #[test]
    fn test_terminal_state_never_reverts() {
        let mut job = Job::submitted(JobId::new("J1"));
        job.observe(report(JobStatus::Failed));
        assert_eq!(job.observe(report(JobStatus::InProgress)), PollState::Failed);
        assert_eq!(job.observe(report(JobStatus::Completed)), PollState::Failed);
        assert_eq!(job.abandon(PollState::TimedOut, "late"), PollState::Failed);
        assert!(job.output.is_none());
    }

    #[test]
    fn test_age_counts_from_submission() {
        let mut job = Job::submitted(JobId::new("J1"));
        assert!(job.age() >= chrono::TimeDelta::zero());

        job.submitted_at -= chrono::TimeDelta::seconds(90);
        assert!(job.age() >= chrono::TimeDelta::seconds(90));
    }

    #[test]
    fn test_abandon_in_progress_job() {
        let mut job = Job::submitted(JobId::new("J1"));
        job.observe(report(JobStatus::InProgress));
        assert_eq!(job.abandon(PollState::Errored, "connection reset"), PollState::Errored);
        assert_eq!(job.error.as_deref(), Some("connection reset"));
    }
}
