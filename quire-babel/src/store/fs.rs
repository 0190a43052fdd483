//! Content store on a local directory.

use super::{ContentStore, StoredFile, WriteRequest};
use crate::error::StoreError;
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Stores files under `root`. Commit messages are only logged.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store path under the root, refusing anything that climbs out.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path leaves the store root"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentStore for FsStore {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(Some(StoredFile { content })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    async fn write(&self, request: WriteRequest) -> Result<(), StoreError> {
        let full = self.resolve(&request.path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io(&request.path, err))?;
        }
        tokio::fs::write(&full, request.content.as_bytes())
            .await
            .map_err(|err| StoreError::io(&request.path, err))?;
        debug!(path = %request.path, message = %request.message, "wrote file");
        Ok(())
    }
}
