// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation creation (spec §4.5.1): idempotent main-conversation
//! creation and always-fresh highlight-conversation creation chained into a
//! question-generation request.

use doc_core::{
    ChunkSeq, ConversationId, ConversationKind, ConversationMeta, ContextMode, DocEvent, DocResult, EventKind,
    MessageId, RequestId, Role,
};
use doc_storage::model::{Conversation, Message};
use tracing::info;

use crate::ctx::EngineCtx;
use crate::support::emit_error;

/// `conversation.main.create`: return the existing main conversation for
/// this (document, demo-scope) if one exists, otherwise create one with a
/// single system message seeded from the requested (or first) chunk.
pub async fn handle_main_create(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::MainCreateRequested { document_id, connection_id, request_id, chunk_id, .. } = event else {
        return;
    };

    let result: DocResult<ConversationId> = (|| {
        let is_demo = ctx.config.example_document_ids.contains(&document_id);
        let demo_scope = is_demo.then(|| connection_id.clone());

        if let Some(existing) = ctx.store.find_main_conversation(document_id, demo_scope.as_ref()) {
            return Ok(existing.id);
        }

        let document = ctx.store.get_document(document_id)?;
        let seed_chunk = chunk_id.unwrap_or(ChunkSeq(0));
        let seed_text = ctx
            .store
            .get_chunk(document_id, seed_chunk)
            .map(|c| c.content)
            .unwrap_or(document.full_text);

        let conversation_id = ConversationId::new();
        ctx.store.create_conversation(Conversation {
            id: conversation_id,
            document_id,
            kind: ConversationKind::Main,
            origin_chunk_id: None,
            highlight_text: None,
            highlight_range: None,
            meta: ConversationMeta { connection_id: demo_scope, seen_chunks: Default::default() },
            is_demo,
            created_at_ms: ctx.now_ms(),
        })?;

        let system_content = format!("{}\n\n{seed_text}", ctx.prompts.system_main(ContextMode::Windowed));
        ctx.store.append_message(
            conversation_id,
            Message {
                id: MessageId::new(),
                conversation_id,
                role: Role::System,
                content: system_content,
                chunk_context: Some(seed_chunk),
                meta: Default::default(),
                created_at_ms: ctx.now_ms(),
            },
        )?;

        Ok(conversation_id)
    })();

    match result {
        Ok(conversation_id) => {
            info!(%document_id, %conversation_id, "main conversation ready");
            let _ = ctx.bus.emit(DocEvent::MainCreateCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationMainCreateRequested,
            err,
        ),
    }
}

/// `conversation.chunk.create`: always creates a new highlight conversation,
/// then chains a `questions.generate` request so the client gets suggested
/// questions without a second round-trip (spec §4.5.1).
pub async fn handle_chunk_create(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::ChunkCreateRequested {
        document_id,
        connection_id,
        request_id,
        chunk_id,
        highlight_range,
        highlight_text,
        user_id,
    } = event
    else {
        return;
    };

    let result: DocResult<ConversationId> = (|| {
        let chunk = ctx.store.get_chunk(document_id, chunk_id)?;
        let is_demo = ctx.config.example_document_ids.contains(&document_id);

        let conversation_id = ConversationId::new();
        ctx.store.create_conversation(Conversation {
            id: conversation_id,
            document_id,
            kind: ConversationKind::Highlight,
            origin_chunk_id: Some(chunk_id),
            highlight_text: Some(highlight_text.clone()),
            highlight_range: Some(highlight_range),
            meta: ConversationMeta {
                connection_id: is_demo.then(|| connection_id.clone()),
                seen_chunks: Default::default(),
            },
            is_demo,
            created_at_ms: ctx.now_ms(),
        })?;

        let system_content = format!(
            "{}\n\n{}\n\n{}",
            ctx.prompts.system_highlight(ContextMode::Windowed),
            chunk.content,
            highlight_text
        );
        ctx.store.append_message(
            conversation_id,
            Message {
                id: MessageId::new(),
                conversation_id,
                role: Role::System,
                content: system_content,
                chunk_context: Some(chunk_id),
                meta: Default::default(),
                created_at_ms: ctx.now_ms(),
            },
        )?;

        Ok(conversation_id)
    })();

    match result {
        Ok(conversation_id) => {
            info!(%document_id, %conversation_id, "highlight conversation created");
            let _ = ctx.bus.emit(DocEvent::ChunkCreateCompleted {
                document_id,
                connection_id: connection_id.clone(),
                request_id: request_id.clone(),
                conversation_id,
            });

            // Derive a distinct request id for the chained request so the
            // client can still correlate the original `chunk.create` call
            // separately from the questions it triggers.
            let chained_request_id = request_id.map(|r| RequestId(format!("{}-questions", r.0)));
            let _ = ctx.bus.emit(DocEvent::QuestionsGenerateRequested {
                document_id,
                connection_id,
                request_id: chained_request_id,
                conversation_id,
                conversation_kind: ConversationKind::Highlight,
                chunk_id: Some(chunk_id),
                count: 3,
                user_id,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationChunkCreateRequested,
            err,
        ),
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
