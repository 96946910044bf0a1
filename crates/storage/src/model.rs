// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted record shapes for the six entities in the data model (§3).

use doc_core::{
    ChunkSeq, ConversationId, ConversationKind, ConversationMeta, DocumentId, DocumentStatus,
    MessageId, MessageMeta, QuestionId, QuestionMeta, Role, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub external_id: Option<String>,
    pub display_name: Option<String>,
    pub created_at_ms: u64,
    pub last_login_at_ms: u64,
    pub cost_accum: f64,
}

impl User {
    pub fn new(email: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            external_id: None,
            display_name: None,
            created_at_ms: now_ms,
            last_login_at_ms: now_ms,
            cost_accum: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// `None` for a curated example document (globally readable).
    pub owner: Option<UserId>,
    pub title: String,
    pub full_text: String,
    pub status: DocumentStatus,
    pub blob_path: Option<String>,
    pub chunk_count: usize,
    pub topic_key: Option<String>,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub document_id: DocumentId,
    pub sequence: ChunkSeq,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub document_id: DocumentId,
    pub kind: ConversationKind,
    pub origin_chunk_id: Option<ChunkSeq>,
    pub highlight_text: Option<String>,
    pub highlight_range: Option<(u32, u32)>,
    pub meta: ConversationMeta,
    pub is_demo: bool,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: Role,
    pub content: String,
    pub chunk_context: Option<ChunkSeq>,
    pub meta: MessageMeta,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub conversation_id: ConversationId,
    pub content: String,
    pub meta: QuestionMeta,
    pub answered: bool,
    pub created_at_ms: u64,
}
