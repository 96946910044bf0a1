// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `conversation.message.send` (spec §4.5.2): admission, context assembly,
//! streamed LLM invocation, and the suggested-question answer side effect.

use doc_adapters::ChatMessage;
use doc_core::{ChunkSeq, ConversationKind, ContextMode, DocEvent, DocError, DocResult, EventKind, MessageId, Role};
use doc_storage::model::{Conversation, Message};
use tracing::info;

use crate::conversation::chunk_switch::{self, HistoryTurn};
use crate::cost;
use crate::ctx::EngineCtx;
use crate::support::emit_error;

pub async fn handle_message_send(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::MessageSendRequested {
        document_id,
        connection_id,
        request_id,
        conversation_id,
        content,
        conversation_kind,
        chunk_id,
        question_id,
        context_mode,
        user_id,
    } = event
    else {
        return;
    };

    let result = send(
        &ctx,
        document_id,
        conversation_id,
        &content,
        conversation_kind,
        chunk_id,
        question_id,
        context_mode,
        user_id,
        &connection_id,
        &request_id,
    )
    .await;

    match result {
        Ok((message_id, response, total_cost)) => {
            info!(%document_id, %conversation_id, "message sent");
            let _ = ctx.bus.emit(DocEvent::MessageSendCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                message_id,
                content: response,
                cost: total_cost,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationMessageSendRequested,
            err,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
async fn send(
    ctx: &EngineCtx,
    document_id: doc_core::DocumentId,
    conversation_id: doc_core::ConversationId,
    content: &str,
    conversation_kind: ConversationKind,
    chunk_id: Option<ChunkSeq>,
    question_id: Option<doc_core::QuestionId>,
    context_mode: ContextMode,
    user_id: Option<doc_core::UserId>,
    connection_id: &doc_core::ConnectionId,
    request_id: &Option<doc_core::RequestId>,
) -> DocResult<(MessageId, String, f64)> {
    cost::check(ctx, user_id)?;

    let conversation = ctx.store.get_conversation(conversation_id)?;
    if conversation_kind == ConversationKind::Main && chunk_id.is_none() {
        return Err(DocError::validation("chunk_id"));
    }
    let effective_chunk = chunk_id.or(conversation.origin_chunk_id);

    let user_message_id = MessageId::new();
    ctx.store.append_message(
        conversation_id,
        Message {
            id: user_message_id,
            conversation_id,
            role: Role::User,
            content: content.to_string(),
            chunk_context: effective_chunk,
            meta: doc_core::MessageMeta { merged_from: None, question_id },
            created_at_ms: ctx.now_ms(),
        },
    )?;

    let history = ctx.store.list_messages(conversation_id)?;
    let llm_messages = assemble_context(ctx, document_id, &conversation, &history, content, context_mode)?;

    let model = match context_mode {
        ContextMode::Full => ctx.config.chat_model_full_context.clone(),
        ContextMode::Windowed => ctx.config.chat_model_default.clone(),
    };

    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    let bus = ctx.bus.clone();
    let doc = document_id;
    let conn = connection_id.clone();
    let rq = request_id.clone();
    let conv = conversation_id;
    let forward = tokio::spawn(async move {
        while let Some(token) = rx.recv().await {
            let _ = bus.emit(DocEvent::ChatToken {
                document_id: doc,
                connection_id: conn.clone(),
                request_id: rq.clone(),
                conversation_id: conv,
                token,
            });
        }
    });

    let completion = ctx
        .llm
        .chat_stream(&model, &llm_messages, tx)
        .await
        .map_err(|e| DocError::UpstreamLlm(e.to_string()))?;
    let _ = forward.await;

    let assistant_message_id = MessageId::new();
    ctx.store.append_message(
        conversation_id,
        Message {
            id: assistant_message_id,
            conversation_id,
            role: Role::Assistant,
            content: completion.content.clone(),
            chunk_context: effective_chunk,
            meta: Default::default(),
            created_at_ms: ctx.now_ms(),
        },
    )?;

    cost::accumulate(ctx, user_id, completion.cost)?;

    if let Some(question_id) = question_id {
        let _ = ctx.store.mark_question_answered(conversation_id, question_id);
    }

    Ok((assistant_message_id, completion.content, completion.cost))
}

fn assemble_context(
    ctx: &EngineCtx,
    document_id: doc_core::DocumentId,
    conversation: &Conversation,
    history: &[Message],
    current_content: &str,
    context_mode: ContextMode,
) -> DocResult<Vec<ChatMessage>> {
    match context_mode {
        ContextMode::Full => {
            let chunks = ctx.store.list_chunks(document_id)?;
            let full_document_text =
                chunks.iter().map(|c| format!("Chunk {}: {}", c.sequence, c.content)).collect::<Vec<_>>().join("\n\n");

            let system_text = match conversation.kind {
                ConversationKind::Highlight => {
                    let highlight_text = conversation.highlight_text.clone().unwrap_or_default();
                    format!(
                        "{}\n\n{full_document_text}\n\nHighlighted text: {highlight_text}",
                        ctx.prompts.system_highlight(ContextMode::Full)
                    )
                }
                ConversationKind::Main => {
                    format!("{}\n\n{full_document_text}", ctx.prompts.system_main(ContextMode::Full))
                }
            };

            let mut messages = vec![ChatMessage { role: Role::System, content: system_text }];
            messages.extend(history.iter().map(|m| ChatMessage { role: m.role, content: m.content.clone() }));
            messages.push(ChatMessage { role: Role::User, content: current_content.to_string() });
            Ok(messages)
        }
        ContextMode::Windowed => match conversation.kind {
            ConversationKind::Highlight => {
                let mut messages: Vec<ChatMessage> =
                    history.iter().map(|m| ChatMessage { role: m.role, content: m.content.clone() }).collect();
                if let Some(last) = messages.last_mut() {
                    let highlight_text = conversation.highlight_text.clone().unwrap_or_default();
                    let chunk_text = conversation
                        .origin_chunk_id
                        .and_then(|c| ctx.store.get_chunk(document_id, c).ok())
                        .map(|c| c.content)
                        .unwrap_or_default();
                    last.content = ctx.prompts.user_highlight(&highlight_text, &chunk_text);
                }
                Ok(messages)
            }
            ConversationKind::Main => {
                let turns: Vec<HistoryTurn> = history
                    .iter()
                    .map(|m| HistoryTurn { role: m.role, content: m.content.clone(), chunk_context: m.chunk_context })
                    .collect();
                let rendered = chunk_switch::compress(&turns, |seq| {
                    ctx.store.get_chunk(document_id, seq).ok().map(|c| c.content)
                });
                Ok(rendered.into_iter().map(|t| ChatMessage { role: t.role, content: t.content }).collect())
            }
        },
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
