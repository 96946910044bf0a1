// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain value types shared by storage, engine, and wire layers.

use crate::id::{ChunkSeq, ConnectionId, ConversationId, DocumentId};
use serde::{Deserialize, Serialize};

/// Role of a message author within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Conversation kind: a whole-document thread, or one anchored to a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Main,
    Highlight,
}

/// Whether a `message.send` assembles the windowed (chunk-switch-compressed)
/// context or the full document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    #[default]
    Windowed,
    Full,
}

/// Processing status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// Tagged metadata carried on a [`crate::domain`]-level `Conversation`.
///
/// Modeled as an explicit struct rather than a schemaless JSON blob (see
/// the Design Notes on dynamic metadata); `connection_id` is set only for
/// demo conversations (§4.8), `seen_chunks` tracks which chunks have
/// already triggered question generation (§4.5.4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub connection_id: Option<ConnectionId>,
    #[serde(default)]
    pub seen_chunks: std::collections::BTreeSet<ChunkSeq>,
}

/// Tagged metadata carried on a `Message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Set only on the synthetic user message appended by a highlight→main
    /// merge (§4.5.5); names the highlight conversation it summarizes.
    pub merged_from: Option<ConversationId>,
    /// Set when this message was produced by accepting a suggested question.
    pub question_id: Option<crate::id::QuestionId>,
}

/// Tagged metadata carried on a `Question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMeta {
    pub chunk_id: ChunkSeq,
}

/// Origin chunk of a conversation: `None` only ever occurs transiently while
/// a main conversation's first system message is composed; every persisted
/// conversation carries a concrete origin per the invariants in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginChunk(pub ChunkSeq);

/// Document membership in the curated, auth-free example set (§4.3, §4.8).
#[derive(Debug, Clone, Default)]
pub struct ExampleDocumentSet(std::collections::HashSet<DocumentId>);

impl ExampleDocumentSet {
    pub fn new(ids: impl IntoIterator<Item = DocumentId>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.0.contains(id)
    }
}
