// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only conversation listings (spec §4.5.6): document-scoped listing
//! (demo-scoped for example documents), message history, and lookup by
//! origin chunk sequence.

use doc_core::{ConversationView, DocEvent, DocResult, EventKind, MessageView};
use doc_storage::model::Conversation;
use tracing::info;

use crate::ctx::EngineCtx;
use crate::support::emit_error;

pub async fn handle_list(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::ListRequested { document_id, connection_id, request_id } = event else {
        return;
    };

    let result = list(&ctx, document_id, &connection_id);
    match result {
        Ok(conversations) => {
            info!(%document_id, count = conversations.len(), "conversations listed");
            let _ = ctx.bus.emit(DocEvent::ListCompleted {
                document_id,
                connection_id,
                request_id,
                conversations: conversations.iter().map(view).collect(),
            });
        }
        Err(err) => {
            emit_error(&ctx.bus, document_id, connection_id, request_id, EventKind::ConversationListRequested, err)
        }
    }
}

pub async fn handle_messages_get(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::MessagesRequested { document_id, connection_id, request_id, conversation_id } = event else {
        return;
    };

    let result: DocResult<Vec<MessageView>> = ctx.store.list_messages(conversation_id).map(|messages| {
        messages
            .into_iter()
            .map(|m| MessageView { id: m.id, role: m.role, content: m.content, chunk_context: m.chunk_context })
            .collect()
    });

    match result {
        Ok(messages) => {
            info!(%document_id, %conversation_id, count = messages.len(), "messages listed");
            let _ = ctx.bus.emit(DocEvent::MessagesCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                messages,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationMessagesRequested,
            err,
        ),
    }
}

pub async fn handle_chunk_get(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::ChunkGetRequested { document_id, connection_id, request_id, sequence_number } = event else {
        return;
    };

    let conversations: Vec<Conversation> = ctx
        .store
        .list_conversations(document_id)
        .into_iter()
        .filter(|c| c.origin_chunk_id == Some(sequence_number))
        .collect();

    info!(%document_id, chunk = %sequence_number, count = conversations.len(), "conversations fetched by chunk");
    let _ = ctx.bus.emit(DocEvent::ChunkGetCompleted {
        document_id,
        connection_id,
        request_id,
        conversations: conversations.iter().map(view).collect(),
    });
}

fn list(ctx: &EngineCtx, document_id: doc_core::DocumentId, connection_id: &doc_core::ConnectionId) -> DocResult<Vec<Conversation>> {
    let is_demo = ctx.config.example_document_ids.contains(&document_id);
    let all = ctx.store.list_conversations(document_id);
    let filtered = if is_demo {
        all.into_iter().filter(|c| c.is_demo && c.meta.connection_id.as_ref() == Some(connection_id)).collect()
    } else {
        all
    };
    Ok(filtered)
}

fn view(c: &Conversation) -> ConversationView {
    ConversationView {
        id: c.id,
        kind: c.kind,
        origin_chunk_id: c.origin_chunk_id,
        is_demo: c.is_demo,
        highlight_text: c.highlight_text.clone(),
        highlight_range: c.highlight_range,
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
