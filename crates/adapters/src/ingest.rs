// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document ingestion collaborator: turns an uploaded blob into extracted
//! text plus a chunk sequence. A real deployment backs this with whatever
//! document-conversion service the product runs (PDF/DOCX extraction,
//! OCR); this crate only defines the seam and its deterministic fake.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub title: String,
    pub full_text: String,
    pub chunks: Vec<String>,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported mime type: {0}")]
    UnsupportedMime(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
}

#[async_trait]
pub trait Ingest: Send + Sync + 'static {
    async fn ingest(&self, bytes: &[u8], mime: &str) -> Result<IngestedDocument, IngestError>;
}

/// Splits plain-text input into fixed-size chunks. Handles only
/// `text/plain`; richer formats are a provider-specific concern left to a
/// real deployment's `Ingest` implementation.
pub struct PlainTextIngest {
    pub chunk_size: usize,
}

impl PlainTextIngest {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

#[async_trait]
impl Ingest for PlainTextIngest {
    async fn ingest(&self, bytes: &[u8], mime: &str) -> Result<IngestedDocument, IngestError> {
        if mime != "text/plain" {
            return Err(IngestError::UnsupportedMime(mime.to_string()));
        }
        let full_text = String::from_utf8(bytes.to_vec())
            .map_err(|e| IngestError::Extraction(e.to_string()))?;
        let title = full_text.lines().next().unwrap_or("Untitled").trim().to_string();
        let chunks = chunk_by_chars(&full_text, self.chunk_size);
        Ok(IngestedDocument { title, full_text, chunks })
    }
}

fn chunk_by_chars(text: &str, chunk_size: usize) -> Vec<String> {
    if chunk_size == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|slice| slice.iter().collect::<String>())
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;

    /// Returns a fixed set of chunks regardless of input, for tests that
    /// care about downstream conversation behavior, not extraction itself.
    pub struct FakeIngest {
        pub title: String,
        pub chunks: Vec<String>,
    }

    impl FakeIngest {
        pub fn new(title: impl Into<String>, chunks: Vec<String>) -> Self {
            Self { title: title.into(), chunks }
        }
    }

    #[async_trait]
    impl Ingest for FakeIngest {
        async fn ingest(&self, _bytes: &[u8], _mime: &str) -> Result<IngestedDocument, IngestError> {
            Ok(IngestedDocument {
                title: self.title.clone(),
                full_text: self.chunks.join(""),
                chunks: self.chunks.clone(),
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeIngest;

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
