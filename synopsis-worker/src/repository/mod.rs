//! Repository layer
//!
//! Repositories are thin adapters over external systems: the inference
//! service and the blob store. They carry no business logic.
//!
//! All repositories are trait-based so the scheduler and services can be
//! exercised against test doubles.

mod blobs;
mod jobs;

// Re-export traits
pub use blobs::BlobRepository;
pub use jobs::JobRepository;

// Re-export implementations
pub use blobs::FsBlobStore;
#[cfg(test)]
pub use blobs::InMemoryBlobStore;
pub use jobs::HttpJobRepository;

// Re-export errors
pub use blobs::BlobError;
pub use jobs::{StatusQueryError, SubmissionError};

#[cfg(test)]
pub use jobs::testing;
