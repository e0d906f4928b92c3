//! Run outcome
//!
//! The structured completion or failure signal printed when a run ends.

use serde::Serialize;
use synopsis_core::domain::job::PollState;

use super::summarize::RunReport;
use crate::error::{RunError, RunResult};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded {
        source: String,
        destination: String,
        job_id: String,
        attempts: u32,
        elapsed_ms: u64,
    },
    Failed {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<PollState>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attempts: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        elapsed_ms: Option<u64>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }
}

impl From<&RunReport> for RunOutcome {
    fn from(report: &RunReport) -> Self {
        RunOutcome::Succeeded {
            source: report.source.to_string(),
            destination: report.destination.to_string(),
            job_id: report.job_id.to_string(),
            attempts: report.attempts,
            elapsed_ms: report.elapsed.as_millis() as u64,
        }
    }
}

impl From<&RunError> for RunOutcome {
    fn from(err: &RunError) -> Self {
        let stats = err.polling_stats();
        RunOutcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
            state: err.poll_state(),
            attempts: stats.map(|(attempts, _)| attempts),
            elapsed_ms: stats.map(|(_, elapsed)| elapsed.as_millis() as u64),
        }
    }
}

impl From<&RunResult<RunReport>> for RunOutcome {
    fn from(result: &RunResult<RunReport>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(err) => err.into(),
        }
    }
}
