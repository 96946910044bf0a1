// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process event type dispatched by the Event Bus (§4.1).
//!
//! `DocEvent` is a typed Rust enum rather than a stringly-typed `{type,
//! data}` bag — the stringly-typed wire representation only exists at the
//! WebSocket boundary (`doc-wire`). `kind()` projects each variant down to
//! an [`EventKind`], which is what the bus's listener table is keyed on and
//! what the wire layer serializes as the frame's `type` field.

use crate::domain::{ConversationKind, ContextMode, DocumentStatus, Role};
use crate::id::{ChunkSeq, ConnectionId, ConversationId, DocumentId, MessageId, QuestionId, RequestId, UserId};
use serde::{Deserialize, Serialize};

/// Minimal read-model views carried on completion events. Kept independent
/// of `doc-storage`'s persisted row shapes so `doc-core` stays the
/// dependency-free base of the workspace; the daemon maps these onto
/// `doc-wire`'s summary DTOs field-for-field, the same way it already does
/// for `MessageSendCompleted`.
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub id: ConversationId,
    pub kind: ConversationKind,
    pub origin_chunk_id: Option<ChunkSeq>,
    pub is_demo: bool,
    pub highlight_text: Option<String>,
    pub highlight_range: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub chunk_context: Option<ChunkSeq>,
}

#[derive(Debug, Clone)]
pub struct QuestionView {
    pub id: QuestionId,
    pub content: String,
    pub chunk_id: ChunkSeq,
    pub answered: bool,
}

#[derive(Debug, Clone)]
pub struct ChunkView {
    pub sequence: ChunkSeq,
    pub content: String,
}

/// The event type key the bus's listener table is keyed on (§4.1: "Listeners
/// are keyed by event `type` (exact match)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ConversationMainCreateRequested,
    ConversationMainCreateCompleted,
    ConversationMainCreateError,
    ConversationChunkCreateRequested,
    ConversationChunkCreateCompleted,
    ConversationChunkCreateError,
    ConversationMessageSendRequested,
    ConversationMessageSendCompleted,
    ConversationMessageSendError,
    ChatToken,
    ChatCompleted,
    ConversationQuestionsGenerateRequested,
    ConversationQuestionsGenerateCompleted,
    ConversationQuestionsGenerateError,
    ConversationQuestionsRegenerateRequested,
    ConversationQuestionsRegenerateCompleted,
    ConversationQuestionsRegenerateError,
    ConversationQuestionsListRequested,
    ConversationQuestionsListCompleted,
    ConversationQuestionsListError,
    ConversationMergeRequested,
    ConversationMergeCompleted,
    ConversationMergeError,
    ConversationListRequested,
    ConversationListCompleted,
    ConversationListError,
    ConversationMessagesRequested,
    ConversationMessagesCompleted,
    ConversationMessagesError,
    ConversationChunkGetRequested,
    ConversationChunkGetCompleted,
    ConversationChunkGetError,
    DocumentChunkListRequested,
    DocumentChunkListCompleted,
    DocumentChunkListError,
    DocumentMetadataRequested,
    DocumentMetadataCompleted,
    DocumentMetadataError,
    DocumentNavigationRequested,
    DocumentNavigationCompleted,
    DocumentNavigationError,
    DocumentProcessingRequested,
    DocumentProcessingCompleted,
    DocumentProcessingError,
}

/// A request or completion/error event flowing through the bus.
///
/// Every variant carries the `document_id` it concerns and, for events
/// that originate from or answer a specific connection, the
/// `connection_id`/`request_id` pair used for routing and correlation.
#[derive(Debug, Clone)]
pub enum DocEvent {
    MainCreateRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        chunk_id: Option<ChunkSeq>,
        user_id: Option<UserId>,
    },
    MainCreateCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
    },
    ChunkCreateRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        chunk_id: ChunkSeq,
        highlight_range: (u32, u32),
        highlight_text: String,
        user_id: Option<UserId>,
    },
    ChunkCreateCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
    },
    MessageSendRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        content: String,
        conversation_kind: ConversationKind,
        chunk_id: Option<ChunkSeq>,
        question_id: Option<QuestionId>,
        context_mode: ContextMode,
        user_id: Option<UserId>,
    },
    MessageSendCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        message_id: MessageId,
        content: String,
        cost: f64,
    },
    ChatToken {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        token: String,
    },
    QuestionsGenerateRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        conversation_kind: ConversationKind,
        chunk_id: Option<ChunkSeq>,
        count: u32,
        user_id: Option<UserId>,
    },
    QuestionsGenerateCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        questions: Vec<QuestionView>,
        cost: f64,
    },
    QuestionsRegenerateRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        chunk_id: Option<ChunkSeq>,
        user_id: Option<UserId>,
    },
    QuestionsRegenerateCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        questions: Vec<QuestionView>,
        cost: f64,
    },
    QuestionsListRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        chunk_id: ChunkSeq,
        user_id: Option<UserId>,
    },
    QuestionsListCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        questions: Vec<QuestionView>,
        cost: f64,
    },
    MergeRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        main_conversation_id: ConversationId,
        highlight_conversation_id: ConversationId,
        user_id: Option<UserId>,
    },
    MergeCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        main_conversation_id: ConversationId,
        highlight_conversation_id: ConversationId,
        summary: String,
        cost: f64,
    },
    ListRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
    },
    ListCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversations: Vec<ConversationView>,
    },
    MessagesRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
    },
    MessagesCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversation_id: ConversationId,
        messages: Vec<MessageView>,
    },
    ChunkGetRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        sequence_number: ChunkSeq,
    },
    ChunkGetCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        conversations: Vec<ConversationView>,
    },
    DocumentChunkListRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
    },
    DocumentChunkListCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        chunks: Vec<ChunkView>,
    },
    DocumentMetadataRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
    },
    DocumentMetadataCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        title: String,
        chunk_count: usize,
        chunks: Vec<ChunkView>,
    },
    DocumentNavigationRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        index: i64,
    },
    DocumentNavigationCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        current: ChunkSeq,
        prev: Option<ChunkSeq>,
        next: Option<ChunkSeq>,
    },
    DocumentProcessingRequested {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
    },
    DocumentProcessingCompleted {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        status: DocumentStatus,
    },
    /// A typed error terminal for any of the above requests.
    Error {
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        in_reply_to: EventKind,
        kind: crate::error::DocErrorKind,
        message: String,
        /// Set only for `CostLimitExceeded` (§7).
        user_cost: Option<f64>,
        limit: Option<f64>,
        /// Set only for `Validation` (§7): the offending field name.
        field: Option<String>,
    },
}

impl DocEvent {
    /// The routing key used by the bus's listener table and the
    /// Connection Registry's per-connection interest filter.
    pub fn kind(&self) -> EventKind {
        use DocEvent::*;
        match self {
            MainCreateRequested { .. } => EventKind::ConversationMainCreateRequested,
            MainCreateCompleted { .. } => EventKind::ConversationMainCreateCompleted,
            ChunkCreateRequested { .. } => EventKind::ConversationChunkCreateRequested,
            ChunkCreateCompleted { .. } => EventKind::ConversationChunkCreateCompleted,
            MessageSendRequested { .. } => EventKind::ConversationMessageSendRequested,
            MessageSendCompleted { .. } => EventKind::ConversationMessageSendCompleted,
            ChatToken { .. } => EventKind::ChatToken,
            QuestionsGenerateRequested { .. } => EventKind::ConversationQuestionsGenerateRequested,
            QuestionsGenerateCompleted { .. } => EventKind::ConversationQuestionsGenerateCompleted,
            QuestionsRegenerateRequested { .. } => EventKind::ConversationQuestionsRegenerateRequested,
            QuestionsRegenerateCompleted { .. } => EventKind::ConversationQuestionsRegenerateCompleted,
            QuestionsListRequested { .. } => EventKind::ConversationQuestionsListRequested,
            QuestionsListCompleted { .. } => EventKind::ConversationQuestionsListCompleted,
            MergeRequested { .. } => EventKind::ConversationMergeRequested,
            MergeCompleted { .. } => EventKind::ConversationMergeCompleted,
            ListRequested { .. } => EventKind::ConversationListRequested,
            ListCompleted { .. } => EventKind::ConversationListCompleted,
            MessagesRequested { .. } => EventKind::ConversationMessagesRequested,
            MessagesCompleted { .. } => EventKind::ConversationMessagesCompleted,
            ChunkGetRequested { .. } => EventKind::ConversationChunkGetRequested,
            ChunkGetCompleted { .. } => EventKind::ConversationChunkGetCompleted,
            DocumentChunkListRequested { .. } => EventKind::DocumentChunkListRequested,
            DocumentChunkListCompleted { .. } => EventKind::DocumentChunkListCompleted,
            DocumentMetadataRequested { .. } => EventKind::DocumentMetadataRequested,
            DocumentMetadataCompleted { .. } => EventKind::DocumentMetadataCompleted,
            DocumentNavigationRequested { .. } => EventKind::DocumentNavigationRequested,
            DocumentNavigationCompleted { .. } => EventKind::DocumentNavigationCompleted,
            DocumentProcessingRequested { .. } => EventKind::DocumentProcessingRequested,
            DocumentProcessingCompleted { .. } => EventKind::DocumentProcessingCompleted,
            Error { in_reply_to, .. } => error_completion_kind(*in_reply_to),
        }
    }

    pub fn document_id(&self) -> DocumentId {
        use DocEvent::*;
        match self {
            MainCreateRequested { document_id, .. }
            | MainCreateCompleted { document_id, .. }
            | ChunkCreateRequested { document_id, .. }
            | ChunkCreateCompleted { document_id, .. }
            | MessageSendRequested { document_id, .. }
            | MessageSendCompleted { document_id, .. }
            | ChatToken { document_id, .. }
            | QuestionsGenerateRequested { document_id, .. }
            | QuestionsGenerateCompleted { document_id, .. }
            | QuestionsRegenerateRequested { document_id, .. }
            | QuestionsRegenerateCompleted { document_id, .. }
            | QuestionsListRequested { document_id, .. }
            | QuestionsListCompleted { document_id, .. }
            | MergeRequested { document_id, .. }
            | MergeCompleted { document_id, .. }
            | ListRequested { document_id, .. }
            | ListCompleted { document_id, .. }
            | MessagesRequested { document_id, .. }
            | MessagesCompleted { document_id, .. }
            | ChunkGetRequested { document_id, .. }
            | ChunkGetCompleted { document_id, .. }
            | DocumentChunkListRequested { document_id, .. }
            | DocumentChunkListCompleted { document_id, .. }
            | DocumentMetadataRequested { document_id, .. }
            | DocumentMetadataCompleted { document_id, .. }
            | DocumentNavigationRequested { document_id, .. }
            | DocumentNavigationCompleted { document_id, .. }
            | DocumentProcessingRequested { document_id, .. }
            | DocumentProcessingCompleted { document_id, .. }
            | Error { document_id, .. } => *document_id,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        use DocEvent::*;
        match self {
            MainCreateRequested { connection_id, .. }
            | MainCreateCompleted { connection_id, .. }
            | ChunkCreateRequested { connection_id, .. }
            | ChunkCreateCompleted { connection_id, .. }
            | MessageSendRequested { connection_id, .. }
            | MessageSendCompleted { connection_id, .. }
            | ChatToken { connection_id, .. }
            | QuestionsGenerateRequested { connection_id, .. }
            | QuestionsGenerateCompleted { connection_id, .. }
            | QuestionsRegenerateRequested { connection_id, .. }
            | QuestionsRegenerateCompleted { connection_id, .. }
            | QuestionsListRequested { connection_id, .. }
            | QuestionsListCompleted { connection_id, .. }
            | MergeRequested { connection_id, .. }
            | MergeCompleted { connection_id, .. }
            | ListRequested { connection_id, .. }
            | ListCompleted { connection_id, .. }
            | MessagesRequested { connection_id, .. }
            | MessagesCompleted { connection_id, .. }
            | ChunkGetRequested { connection_id, .. }
            | ChunkGetCompleted { connection_id, .. }
            | DocumentChunkListRequested { connection_id, .. }
            | DocumentChunkListCompleted { connection_id, .. }
            | DocumentMetadataRequested { connection_id, .. }
            | DocumentMetadataCompleted { connection_id, .. }
            | DocumentNavigationRequested { connection_id, .. }
            | DocumentNavigationCompleted { connection_id, .. }
            | DocumentProcessingRequested { connection_id, .. }
            | DocumentProcessingCompleted { connection_id, .. }
            | Error { connection_id, .. } => connection_id.clone(),
        }
    }

    /// Build the `.error` terminal for `err`, carrying whatever structured
    /// detail the error kind defines (§7's `user_cost`/`limit`/`field`).
    pub fn error_from(
        document_id: DocumentId,
        connection_id: ConnectionId,
        request_id: Option<RequestId>,
        in_reply_to: EventKind,
        err: &crate::error::DocError,
    ) -> Self {
        use crate::error::DocError;
        let (user_cost, limit) = match err {
            DocError::CostLimitExceeded { user_cost, limit } => (Some(*user_cost), Some(*limit)),
            _ => (None, None),
        };
        let field = match err {
            DocError::Validation { field } => Some(field.clone()),
            _ => None,
        };
        DocEvent::Error {
            document_id,
            connection_id,
            request_id,
            in_reply_to,
            kind: err.kind(),
            message: err.to_string(),
            user_cost,
            limit,
            field,
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        use DocEvent::*;
        match self {
            MainCreateRequested { request_id, .. }
            | MainCreateCompleted { request_id, .. }
            | ChunkCreateRequested { request_id, .. }
            | ChunkCreateCompleted { request_id, .. }
            | MessageSendRequested { request_id, .. }
            | MessageSendCompleted { request_id, .. }
            | ChatToken { request_id, .. }
            | QuestionsGenerateRequested { request_id, .. }
            | QuestionsGenerateCompleted { request_id, .. }
            | QuestionsRegenerateRequested { request_id, .. }
            | QuestionsRegenerateCompleted { request_id, .. }
            | QuestionsListRequested { request_id, .. }
            | QuestionsListCompleted { request_id, .. }
            | MergeRequested { request_id, .. }
            | MergeCompleted { request_id, .. }
            | ListRequested { request_id, .. }
            | ListCompleted { request_id, .. }
            | MessagesRequested { request_id, .. }
            | MessagesCompleted { request_id, .. }
            | ChunkGetRequested { request_id, .. }
            | ChunkGetCompleted { request_id, .. }
            | DocumentChunkListRequested { request_id, .. }
            | DocumentChunkListCompleted { request_id, .. }
            | DocumentMetadataRequested { request_id, .. }
            | DocumentMetadataCompleted { request_id, .. }
            | DocumentNavigationRequested { request_id, .. }
            | DocumentNavigationCompleted { request_id, .. }
            | DocumentProcessingRequested { request_id, .. }
            | DocumentProcessingCompleted { request_id, .. }
            | Error { request_id, .. } => request_id.clone(),
        }
    }
}

fn error_completion_kind(in_reply_to: EventKind) -> EventKind {
    use EventKind::*;
    match in_reply_to {
        ConversationMainCreateRequested => ConversationMainCreateError,
        ConversationChunkCreateRequested => ConversationChunkCreateError,
        ConversationMessageSendRequested => ConversationMessageSendError,
        ConversationQuestionsGenerateRequested => ConversationQuestionsGenerateError,
        ConversationQuestionsRegenerateRequested => ConversationQuestionsRegenerateError,
        ConversationQuestionsListRequested => ConversationQuestionsListError,
        ConversationMergeRequested => ConversationMergeError,
        ConversationListRequested => ConversationListError,
        ConversationMessagesRequested => ConversationMessagesError,
        ConversationChunkGetRequested => ConversationChunkGetError,
        DocumentChunkListRequested => DocumentChunkListError,
        DocumentMetadataRequested => DocumentMetadataError,
        DocumentNavigationRequested => DocumentNavigationError,
        DocumentProcessingRequested => DocumentProcessingError,
        other => other,
    }
}
