//! Synopsis Worker
//!
//! Summarizes one uploaded transcript per invocation.
//!
//! Architecture:
//! - Configuration: Resolved once from the environment
//! - Repositories: Inference service and blob store access
//! - Scheduler: Bounded, fixed-interval job status polling
//! - Services: The end-to-end summarization run
//!
//! The worker reads a storage event notification, submits the referenced
//! transcript to the inference service, polls the job until it finishes,
//! and writes the summary back to the blob store. The run outcome is printed
//! to stdout as JSON; logs go to stderr.

mod config;
mod error;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use synopsis_core::dto::event::TriggerError;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::Config;
use crate::error::RunResult;
use crate::repository::{BlobRepository, FsBlobStore, HttpJobRepository, JobRepository};
use crate::service::{RunOutcome, RunReport, SummarizationService};
use synopsis_client::InferenceClient;

#[derive(Parser)]
#[command(name = "synopsis-worker")]
#[command(about = "Summarize an uploaded transcript with a remote inference job", long_about = None)]
struct Cli {
    /// Event notification JSON file; read from stdin when omitted
    #[arg(long)]
    event: Option<PathBuf>,

    /// Blob store root directory, one subdirectory per bucket
    #[arg(long, env = "BLOB_ROOT", default_value = "./data")]
    blob_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging; stdout is reserved for the outcome
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synopsis_worker=info,synopsis_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    info!("Starting Synopsis Worker");

    let config = load_config()?;
    info!("Loaded configuration: {:?}", config);

    let client = InferenceClient::with_timeout(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.request_timeout,
    )
    .context("Failed to build inference client")?;

    let jobs: Arc<dyn JobRepository> = Arc::new(HttpJobRepository::new(client));
    let blobs: Arc<dyn BlobRepository> = Arc::new(FsBlobStore::new(cli.blob_root));
    let service = SummarizationService::new(&config, blobs, jobs);

    let cancel = CancellationToken::new();
    let watchers = spawn_cancellation_watchers(&cancel, config.run_timeout);

    let run_id = Uuid::new_v4();
    let result = run(&service, cli.event.as_deref(), &cancel)
        .instrument(info_span!("run", %run_id))
        .await;

    for watcher in watchers {
        watcher.abort();
    }

    match &result {
        Ok(report) => info!(
            "Run {} succeeded: {} -> {}",
            run_id, report.source, report.destination
        ),
        Err(e) => error!("Run {} failed ({}): {}", run_id, e.kind(), e),
    }

    let outcome = RunOutcome::from(&result);
    println!(
        "{}",
        serde_json::to_string(&outcome).context("Failed to serialize run outcome")?
    );

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Loads and validates configuration from environment variables
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

/// Reads the trigger and runs it through the service
///
/// An unreadable trigger ends the run like any other malformed one.
async fn run(
    service: &SummarizationService,
    event: Option<&Path>,
    cancel: &CancellationToken,
) -> RunResult<RunReport> {
    let payload = read_event(event).await?;
    service.handle_event(&payload, cancel).await
}

/// Reads the trigger payload from `path`, or stdin when no path is given
async fn read_event(path: Option<&Path>) -> Result<String, TriggerError> {
    match path {
        Some(path) => {
            debug!("Reading event from {}", path.display());
            tokio::fs::read_to_string(path).await.map_err(|e| {
                error!("Failed to read event file {}: {}", path.display(), e);
                TriggerError::Unreadable(e)
            })
        }
        None => {
            debug!("Reading event from stdin");
            let mut payload = String::new();
            tokio::io::stdin().read_to_string(&mut payload).await?;
            Ok(payload)
        }
    }
}

/// Cancels `cancel` on Ctrl-C and, if set, once `run_timeout` elapses
fn spawn_cancellation_watchers(
    cancel: &CancellationToken,
    run_timeout: Option<Duration>,
) -> Vec<JoinHandle<()>> {
    let mut watchers = Vec::new();

    let token = cancel.clone();
    watchers.push(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping run");
            token.cancel();
        }
    }));

    if let Some(timeout) = run_timeout {
        let token = cancel.clone();
        watchers.push(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!("Run deadline of {:?} reached, stopping run", timeout);
            token.cancel();
        }));
    }

    watchers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryBlobStore;
    use crate::repository::testing::{ScriptedJobRepository, completed};
    use synopsis_core::domain::document::ObjectLocation;

    fn service(
        blobs: &Arc<InMemoryBlobStore>,
        jobs: &Arc<ScriptedJobRepository>,
    ) -> SummarizationService {
        let mut config = Config::new("key".into(), "http://localhost:8000".into());
        config.poll_interval = Duration::ZERO;
        SummarizationService::new(&config, blobs.clone(), jobs.clone())
    }

    #[tokio::test]
    async fn test_missing_event_file_is_malformed_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = Arc::new(InMemoryBlobStore::new());
        let jobs = Arc::new(ScriptedJobRepository::accepting("J1", []));
        let path = dir.path().join("missing.json");

        let result = run(
            &service(&blobs, &jobs),
            Some(path.as_path()),
            &CancellationToken::new(),
        )
        .await;

        let err = result.as_ref().unwrap_err();
        assert_eq!(err.kind(), "MalformedTriggerError");
        assert_eq!(jobs.submit_calls(), 0);

        let outcome = serde_json::to_value(RunOutcome::from(&result)).unwrap();
        assert_eq!(outcome["status"], "failed");
        assert_eq!(outcome["kind"], "MalformedTriggerError");
    }

    #[tokio::test]
    async fn test_event_file_drives_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"Records": [{"s3": {"bucket": {"name": "in"}, "object": {"key": "a.txt"}}}]}"#,
        )
        .unwrap();

        let blobs = Arc::new(InMemoryBlobStore::new());
        blobs.insert(ObjectLocation::new("in", "a.txt"), "hello world");
        let jobs = Arc::new(ScriptedJobRepository::accepting(
            "J1",
            [completed(serde_json::json!({ "text": "SUMMARY" }))],
        ));

        let report = run(&service(&blobs, &jobs), Some(path.as_path()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.destination, ObjectLocation::new("in", "summaries/a.txt"));
    }
}
