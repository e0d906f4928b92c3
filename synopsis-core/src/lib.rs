//! Synopsis Core
//!
//! Core types and abstractions for the Synopsis summarization worker.
//!
//! This crate contains:
//! - Domain types: source documents, summarization requests, jobs and artifacts
//! - DTOs: wire payloads for the inference service and storage event notifications

pub mod domain;
pub mod dto;
