// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound frames sent back over the WebSocket (§4.3's outbound contract,
//! §7's error-kind table).

use doc_core::{ChunkSeq, ConversationId, ConversationKind, DocErrorKind, DocumentId, MessageId, QuestionId, RequestId};
use serde::{Deserialize, Serialize};

/// A conversation summary as returned by `conversation.list` / `conversation.chunk.get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub kind: ConversationKind,
    pub origin_chunk_id: Option<ChunkSeq>,
    pub is_demo: bool,
    #[serde(default)]
    pub highlight_text: Option<String>,
    #[serde(default)]
    pub highlight_range: Option<(u32, u32)>,
}

/// A message as returned by `conversation.messages.get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSummary {
    pub id: MessageId,
    pub role: doc_core::Role,
    pub content: String,
    pub chunk_context: Option<ChunkSeq>,
}

/// A suggested question as returned by question generation/listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub content: String,
    pub chunk_id: ChunkSeq,
    pub answered: bool,
}

/// A chunk entry as returned by `document.chunk.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkSummary {
    pub sequence: ChunkSeq,
    pub content: String,
    pub length: usize,
}

/// Outbound frame, always carrying `request_id` to echo the inbound frame
/// that triggered it (§8: "For every `.error` and `.completed` event,
/// `request_id` is present iff the originating client frame carried one").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundFrame {
    #[serde(rename = "conversation.main.create.completed")]
    MainCreateCompleted { conversation_id: ConversationId },

    #[serde(rename = "conversation.chunk.create.completed")]
    ChunkCreateCompleted { conversation_id: ConversationId },

    #[serde(rename = "conversation.message.send.completed")]
    MessageSendCompleted { message: String, conversation_id: ConversationId, cost: f64 },

    #[serde(rename = "chat.token")]
    ChatToken { conversation_id: ConversationId, token: String },

    #[serde(rename = "chat.completed")]
    ChatCompleted { conversation_id: ConversationId, content: String },

    #[serde(rename = "conversation.questions.generate.completed")]
    QuestionsGenerateCompleted { questions: Vec<QuestionSummary>, cost: f64 },

    #[serde(rename = "conversation.questions.regenerate.completed")]
    QuestionsRegenerateCompleted { questions: Vec<QuestionSummary>, cost: f64 },

    #[serde(rename = "conversation.questions.list.completed")]
    QuestionsListCompleted { questions: Vec<QuestionSummary> },

    #[serde(rename = "conversation.merge.completed")]
    MergeCompleted {
        main_id: ConversationId,
        highlight_id: ConversationId,
        summary: String,
        cost: f64,
    },

    #[serde(rename = "conversation.list.completed")]
    ListCompleted { conversations: Vec<ConversationSummary> },

    #[serde(rename = "conversation.messages.completed")]
    MessagesCompleted { messages: Vec<MessageSummary> },

    #[serde(rename = "conversation.chunk.get.completed")]
    ChunkGetCompleted { conversations: Vec<ConversationSummary> },

    #[serde(rename = "document.chunk.list.completed")]
    DocumentChunkListCompleted { chunks: Vec<ChunkSummary> },

    #[serde(rename = "document.metadata.completed")]
    DocumentMetadataCompleted {
        document_id: DocumentId,
        title: String,
        chunk_count: usize,
        chunks: Vec<ChunkSummary>,
    },

    #[serde(rename = "document.navigation.completed")]
    DocumentNavigationCompleted {
        current: ChunkSeq,
        prev: Option<ChunkSeq>,
        next: Option<ChunkSeq>,
    },

    #[serde(rename = "document.processing.completed")]
    DocumentProcessingCompleted { status: doc_core::DocumentStatus },

    /// Terminal for any request type: `type` is the originating request's
    /// type with `.error` substituted for `.completed`/`.requested`.
    Error {
        #[serde(rename = "in_reply_to")]
        in_reply_to: String,
        kind: DocErrorKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_cost: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

/// The full outbound envelope: `{type, data, request_id?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundEnvelope {
    #[serde(flatten)]
    pub frame: OutboundFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl OutboundEnvelope {
    pub fn to_json(&self) -> String {
        // Infallible: every field type here serializes without error.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
