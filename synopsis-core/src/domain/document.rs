//! Document domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default prefix under which summaries are written
pub const DEFAULT_OUTPUT_PREFIX: &str = "summaries";

/// A (bucket, key) pair addressing one object in the blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Transcript read from the blob store
///
/// Read once per run and dropped after the summarization request is built.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub location: ObjectLocation,
    pub text: String,
}

impl SourceDocument {
    pub fn new(location: ObjectLocation, text: String) -> Self {
        Self { location, text }
    }

    /// Size of the transcript in bytes
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    /// True when the transcript holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Summary text destined for the blob store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryArtifact {
    pub location: ObjectLocation,
    pub text: String,
}

impl SummaryArtifact {
    /// Content type attached to written summaries
    pub const CONTENT_TYPE: &'static str = "text/plain; charset=utf-8";

    pub fn new(location: ObjectLocation, text: String) -> Self {
        Self { location, text }
    }
}

/// Location of the summary for `source`, under `prefix` in `bucket`
pub fn summary_location(
    source: &ObjectLocation,
    bucket: impl Into<String>,
    prefix: &str,
) -> ObjectLocation {
    ObjectLocation::new(bucket, derive_destination_key(prefix, &source.key))
}

/// Derives the destination key for a source key
///
/// The source key is embedded verbatim beneath the prefix, so two distinct
/// source keys never map to the same destination.
pub fn derive_destination_key(prefix: &str, source_key: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        source_key.to_string()
    } else {
        format!("{}/{}", prefix, source_key)
    }
}
