// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound client frames (§4.3's "Inbound frame contract").

use doc_core::{ChunkSeq, ConversationId, ConversationKind, QuestionId, RequestId};
use serde::{Deserialize, Serialize};

/// `{type, data, request_id?}` as received on the `conversation` scope
/// WebSocket stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConversationRequest {
    #[serde(rename = "conversation.main.create")]
    MainCreate { chunk_id: Option<ChunkSeq> },

    #[serde(rename = "conversation.chunk.create")]
    ChunkCreate {
        chunk_id: ChunkSeq,
        highlight_range: (u32, u32),
        highlight_text: String,
    },

    #[serde(rename = "conversation.message.send")]
    MessageSend {
        conversation_id: ConversationId,
        content: String,
        conversation_type: ConversationKind,
        chunk_id: Option<ChunkSeq>,
        #[serde(default)]
        question_id: Option<QuestionId>,
        #[serde(default)]
        use_full_context: bool,
    },

    #[serde(rename = "conversation.questions.generate")]
    QuestionsGenerate {
        conversation_id: ConversationId,
        conversation_type: ConversationKind,
        #[serde(default)]
        count: Option<u32>,
        #[serde(default)]
        chunk_id: Option<ChunkSeq>,
    },

    #[serde(rename = "conversation.questions.regenerate")]
    QuestionsRegenerate {
        conversation_id: ConversationId,
        #[serde(default)]
        chunk_id: Option<ChunkSeq>,
    },

    #[serde(rename = "conversation.chunk.merge")]
    ChunkMerge {
        main_conversation_id: ConversationId,
        highlight_conversation_id: ConversationId,
    },

    #[serde(rename = "conversation.list")]
    List,

    #[serde(rename = "conversation.messages.get")]
    MessagesGet { conversation_id: ConversationId },

    #[serde(rename = "conversation.get.by.sequence")]
    GetBySequence { sequence_number: ChunkSeq },

    #[serde(rename = "document.chunk.list")]
    DocumentChunkList,
}

/// The envelope actually read off the socket: `{type, data, request_id?}`.
/// `request_id` lives outside `data` so it survives regardless of which
/// variant is being decoded; we deserialize in two passes (see
/// `decode_conversation_frame`) because `serde(tag, content)` can't itself
/// capture a sibling field.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    #[serde(flatten)]
    pub request: ConversationRequest,
    pub request_id: Option<RequestId>,
}

/// Decode one inbound conversation-scope frame from raw JSON text.
pub fn decode_conversation_frame(
    text: &str,
) -> Result<(ConversationRequest, Option<RequestId>), serde_json::Error> {
    let envelope: InboundEnvelope = serde_json::from_str(text)?;
    Ok((envelope.request, envelope.request_id))
}

/// Document-scope frames are purely subscriptive: the client sends no
/// request bodies of its own, only implicit interest by connecting; kept as
/// a marker type so the listener module has something concrete to route on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DocumentRequest {
    #[serde(rename = "document.metadata.get")]
    MetadataGet,
    #[serde(rename = "document.chunk.list")]
    ChunkList,
    #[serde(rename = "document.navigation.get")]
    Navigation { index: i64 },
    #[serde(rename = "document.processing.get")]
    Processing,
}

/// The envelope read off the socket on the `document` scope: `{type, data,
/// request_id?}`, mirroring [`InboundEnvelope`] for the conversation scope.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInboundEnvelope {
    #[serde(flatten)]
    pub request: DocumentRequest,
    pub request_id: Option<RequestId>,
}

/// Decode one inbound document-scope frame from raw JSON text.
pub fn decode_document_frame(text: &str) -> Result<(DocumentRequest, Option<RequestId>), serde_json::Error> {
    let envelope: DocumentInboundEnvelope = serde_json::from_str(text)?;
    Ok((envelope.request, envelope.request_id))
}
