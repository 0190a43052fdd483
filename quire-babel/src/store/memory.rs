//! In-memory content store.

use super::{ContentStore, StoredFile, WriteRequest};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps files in a map and records every write, in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, String>>,
    commits: RwLock<Vec<WriteRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file before the store is shared.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.get_mut().insert(path.into(), content.into());
        self
    }

    pub async fn get(&self, path: &str) -> Option<String> {
        self.files.read().await.get(path).cloned()
    }

    /// Every write so far, oldest first.
    pub async fn commits(&self) -> Vec<WriteRequest> {
        self.commits.read().await.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let files = self.files.read().await;
        Ok(files.get(path).map(|content| StoredFile {
            content: content.clone(),
        }))
    }

    async fn write(&self, request: WriteRequest) -> Result<(), StoreError> {
        self.files
            .write()
            .await
            .insert(request.path.clone(), request.content.clone());
        self.commits.write().await.push(request);
        Ok(())
    }
}
