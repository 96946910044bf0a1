// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable blob storage for the original uploaded document bytes. Separate
//! from `doc-storage`'s record store: blobs are large, opaque, and never
//! queried by value, so they belong behind their own narrow interface.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("blob backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Stores blobs as files under a base directory. Adequate for a single-node
/// deployment; a multi-node deployment swaps in an S3-backed `BlobStore`
/// without the engine changing.
pub struct FileBlobStore {
    base_dir: std::path::PathBuf,
}

impl FileBlobStore {
    pub fn new(base_dir: impl Into<std::path::PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| BlobError::Backend(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|e| BlobError::Backend(e.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        tokio::fs::read(self.path_for(key)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(key.to_string())
            } else {
                BlobError::Backend(e.to_string())
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Backend(e.to_string())),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeBlobStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl FakeBlobStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
            self.blobs.lock().insert(key.to_string(), bytes);
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
            self.blobs.lock().get(key).cloned().ok_or_else(|| BlobError::NotFound(key.to_string()))
        }

        async fn delete(&self, key: &str) -> Result<(), BlobError> {
            self.blobs.lock().remove(key);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBlobStore;

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
