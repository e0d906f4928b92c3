//! Blob repository
//!
//! Get/put access to the object store that holds transcripts and summaries.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use synopsis_core::domain::document::ObjectLocation;
use thiserror::Error;
use tracing::debug;

/// Errors returned by blob stores
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object {0} does not exist")]
    NotFound(ObjectLocation),

    #[error("object location {0} is not a valid path")]
    InvalidKey(ObjectLocation),

    #[error("object is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository trait for object storage
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// Reads the whole object at `location`
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, BlobError>;

    /// Writes `body` to `location`, replacing any existing object
    async fn put(
        &self,
        location: &ObjectLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError>;

    /// Reads the object at `location` as UTF-8 text
    async fn get_text(&self, location: &ObjectLocation) -> Result<String, BlobError> {
        let bytes = self.get(location).await?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Filesystem-backed blob store
///
/// Each bucket is a directory under `root`; keys are relative paths within it.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a location to a path, refusing anything that escapes its bucket
    fn path_for(&self, location: &ObjectLocation) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidKey(location.clone());

        if !is_plain_relative(Path::new(&location.bucket), true)
            || !is_plain_relative(Path::new(&location.key), false)
            || location
                .key
                .split('/')
                .any(|segment| segment.is_empty() || segment == ".")
        {
            return Err(invalid());
        }

        Ok(self.root.join(&location.bucket).join(&location.key))
    }
}

fn is_plain_relative(path: &Path, single: bool) -> bool {
    let mut components = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => components += 1,
            _ => return false,
        }
    }
    components > 0 && (!single || components == 1)
}

#[async_trait]
impl BlobRepository for FsBlobStore {
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(location)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(location.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        let path = self.path_for(location)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!(
            "Writing {} bytes ({}) to {}",
            body.len(),
            content_type,
            path.display()
        );
        tokio::fs::write(&path, body).await?;
        Ok(())
    }
}

/// In-memory blob store
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: std::sync::RwLock<std::collections::HashMap<ObjectLocation, Vec<u8>>>,
}

#[cfg(test)]
impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object, bypassing the async interface
    pub fn insert(&self, location: ObjectLocation, body: impl Into<Vec<u8>>) {
        self.objects.write().unwrap().insert(location, body.into());
    }

    /// Returns a copy of the object at `location`, if any
    pub fn object(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        self.objects.read().unwrap().get(location).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[async_trait]
impl BlobRepository for InMemoryBlobStore {
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, BlobError> {
        self.object(location)
            .ok_or_else(|| BlobError::NotFound(location.clone()))
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BlobError> {
        self.insert(location.clone(), body);
        Ok(())
    }
}
