//! Scheduler layer for the worker
//!
//! This layer drives a submitted job to a terminal state by polling the
//! inference service on a fixed cadence with a bounded number of attempts.

pub mod poller;

pub use poller::StatusPoller;
