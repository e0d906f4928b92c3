//! Core domain types
//!
//! These types describe one summarization run: the document that was read,
//! the request sent to the inference service, the remote job it created,
//! and the artifact written back to storage.

pub mod document;
pub mod job;
pub mod request;
