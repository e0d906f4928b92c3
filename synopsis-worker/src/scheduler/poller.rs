//! Job status poller
//!
//! Sleeps one interval before every status query and stops at the first
//! terminal answer, at the first failed query, on cancellation, or once the
//! attempt budget is spent.

use std::sync::Arc;
use synopsis_core::domain::job::{Job, PollState};
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::repository::{JobRepository, StatusQueryError};

/// Where and how a polling run ended
#[derive(Debug)]
pub struct PollOutcome {
    /// The job in its terminal state
    pub job: Job,
    /// Number of status queries issued
    pub attempts: u32,
    /// Wall time spent polling, waits included
    pub elapsed: Duration,
    /// The failed query that ended the run in `ERRORED`
    pub query_error: Option<StatusQueryError>,
}

impl PollOutcome {
    pub fn state(&self) -> PollState {
        self.job.state
    }
}

/// Fixed-interval, bounded status poller
pub struct StatusPoller {
    jobs: Arc<dyn JobRepository>,
    max_attempts: u32,
    interval: Duration,
}

impl StatusPoller {
    /// Creates a poller issuing at most `max_attempts` queries, `interval` apart
    pub fn new(jobs: Arc<dyn JobRepository>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            jobs,
            max_attempts,
            interval,
        }
    }

    /// Polls `job` until it reaches a terminal state
    ///
    /// Cancelling `cancel` ends the run in `TIMED_OUT` at the next suspension
    /// point, including mid-query.
    pub async fn run(&self, mut job: Job, cancel: &CancellationToken) -> PollOutcome {
        let started = Instant::now();
        let mut attempts = 0;

        info!(
            "Polling job {} (max {} attempts, interval {:?})",
            job.id, self.max_attempts, self.interval
        );

        while attempts < self.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.cancelled(job, attempts, started);
                }
                _ = time::sleep(self.interval) => {}
            }

            attempts += 1;
            debug!(
                "Querying status of job {} (attempt {}/{})",
                job.id, attempts, self.max_attempts
            );

            let job_id = job.id.clone();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.cancelled(job, attempts, started);
                }
                result = self.jobs.fetch_status(&job_id) => result,
            };

            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    error!("Status query failed on attempt {}: {}", attempts, e);
                    job.abandon(PollState::Errored, e.to_string());
                    let mut outcome = self.finished(job, attempts, started);
                    outcome.query_error = Some(e);
                    return outcome;
                }
            };

            let status = report.status;
            match job.observe(report) {
                PollState::Succeeded => {
                    info!("Job {} completed after {} attempt(s)", job.id, attempts);
                    return self.finished(job, attempts, started);
                }
                PollState::Failed => {
                    warn!(
                        "Job {} ended with status {} after {} attempt(s)",
                        job.id, status, attempts
                    );
                    return self.finished(job, attempts, started);
                }
                _ => {
                    info!(
                        "Job {} is {} (attempt {}/{})",
                        job.id, status, attempts, self.max_attempts
                    );
                }
            }
        }

        warn!(
            "Job {} still running after {} attempt(s), giving up",
            job.id, attempts
        );
        job.abandon(
            PollState::TimedOut,
            format!("job still running after {} polling attempts", attempts),
        );
        self.finished(job, attempts, started)
    }

    fn cancelled(&self, mut job: Job, attempts: u32, started: Instant) -> PollOutcome {
        warn!("Polling of job {} cancelled after {} attempt(s)", job.id, attempts);
        job.abandon(
            PollState::TimedOut,
            format!("run cancelled after {} polling attempts", attempts),
        );
        self.finished(job, attempts, started)
    }

    fn finished(&self, job: Job, attempts: u32, started: Instant) -> PollOutcome {
        info!(
            "Job {} settled in {} {}ms after submission",
            job.id,
            job.state,
            job.age().num_milliseconds()
        );
        PollOutcome {
            job,
            attempts,
            elapsed: started.elapsed(),
            query_error: None,
        }
    }
}
