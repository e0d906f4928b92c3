//! Run error types
//!
//! Every failure of a run maps to exactly one [`RunError`] variant. Each
//! variant is terminal for the run; nothing is retried.

use std::time::Duration;
use synopsis_core::domain::document::ObjectLocation;
use synopsis_core::domain::job::{JobId, PollState};
use synopsis_core::dto::event::TriggerError;
use thiserror::Error;

use crate::repository::{BlobError, StatusQueryError, SubmissionError};

/// Result type alias for a run
pub type RunResult<T> = std::result::Result<T, RunError>;

/// Errors that end a summarization run
#[derive(Debug, Error)]
pub enum RunError {
    /// Trigger payload absent or structurally invalid
    #[error("malformed trigger: {0}")]
    MalformedTrigger(#[from] TriggerError),

    /// Source object missing or unreadable
    #[error("failed to read source {location}: {source}")]
    SourceRead {
        location: ObjectLocation,
        #[source]
        source: BlobError,
    },

    /// Source object holds no text
    #[error("source {0} is empty")]
    EmptySource(ObjectLocation),

    /// Inference service rejected or never received the job
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Polling ended in `FAILED`, `TIMED_OUT` or `ERRORED`
    #[error("job {job_id} ended in {state} after {attempts} attempt(s) ({elapsed:?}): {detail}")]
    SummarizationFailed {
        job_id: JobId,
        state: PollState,
        /// Remote error detail, verbatim when the service supplied one
        detail: String,
        attempts: u32,
        elapsed: Duration,
        #[source]
        cause: Option<StatusQueryError>,
    },

    /// Job output carried no summary text
    #[error("could not extract summary from job output: {0}")]
    ResultParse(String),

    /// Summary could not be stored
    #[error("failed to write summary to {location}: {source}")]
    DestinationWrite {
        location: ObjectLocation,
        #[source]
        source: BlobError,
    },
}

impl RunError {
    /// Stable name of the error kind, used in the run outcome
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::MalformedTrigger(_) => "MalformedTriggerError",
            RunError::SourceRead { .. } => "SourceReadError",
            RunError::EmptySource(_) => "EmptySourceError",
            RunError::Submission(_) => "SubmissionError",
            RunError::SummarizationFailed { .. } => "SummarizationFailedError",
            RunError::ResultParse(_) => "ResultParseError",
            RunError::DestinationWrite { .. } => "DestinationWriteError",
        }
    }

    /// Terminal polling state, for polling failures
    pub fn poll_state(&self) -> Option<PollState> {
        match self {
            RunError::SummarizationFailed { state, .. } => Some(*state),
            _ => None,
        }
    }

    /// Attempts consumed and time spent polling, for polling failures
    pub fn polling_stats(&self) -> Option<(u32, Duration)> {
        match self {
            RunError::SummarizationFailed {
                attempts, elapsed, ..
            } => Some((*attempts, *elapsed)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synopsis_client::ClientError;

    #[test]
    fn test_kinds() {
        let location = ObjectLocation::new("in", "a.txt");
        assert_eq!(RunError::EmptySource(location.clone()).kind(), "EmptySourceError");
        assert_eq!(
            RunError::Submission(SubmissionError(ClientError::api_error(500, "boom"))).kind(),
            "SubmissionError"
        );
        assert_eq!(
            RunError::DestinationWrite {
                location,
                source: BlobError::Io(std::io::Error::other("disk full")),
            }
            .kind(),
            "DestinationWriteError"
        );
    }

    #[test]
    fn test_summarization_failed_message() {
        let err = RunError::SummarizationFailed {
            job_id: JobId::new("J1"),
            state: PollState::Failed,
            detail: "CUDA out of memory".into(),
            attempts: 4,
            elapsed: Duration::from_secs(20),
            cause: None,
        };

        assert_eq!(err.kind(), "SummarizationFailedError");
        assert_eq!(err.poll_state(), Some(PollState::Failed));
        assert_eq!(err.polling_stats(), Some((4, Duration::from_secs(20))));
        assert_eq!(
            err.to_string(),
            "job J1 ended in FAILED after 4 attempt(s) (20s): CUDA out of memory"
        );
    }
}
