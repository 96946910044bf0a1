// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Highlight -> main merge (spec §4.5.5): summarize a highlight thread with
//! the LLM and append the summary as a synthetic exchange on the main
//! conversation. The highlight conversation is left intact.

use doc_core::{DocError, DocEvent, DocResult, EventKind, MessageId, MessageMeta, Role};
use doc_storage::model::Message;
use tracing::info;

use crate::cost;
use crate::ctx::EngineCtx;
use crate::support::emit_error;

pub async fn handle_merge(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::MergeRequested {
        document_id,
        connection_id,
        request_id,
        main_conversation_id,
        highlight_conversation_id,
        user_id,
    } = event
    else {
        return;
    };

    let result = merge(&ctx, main_conversation_id, highlight_conversation_id, user_id).await;
    match result {
        Ok((summary, cost)) => {
            info!(%document_id, %main_conversation_id, %highlight_conversation_id, "conversations merged");
            let _ = ctx.bus.emit(DocEvent::MergeCompleted {
                document_id,
                connection_id,
                request_id,
                main_conversation_id,
                highlight_conversation_id,
                summary,
                cost,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationMergeRequested,
            err,
        ),
    }
}

async fn merge(
    ctx: &EngineCtx,
    main_id: doc_core::ConversationId,
    highlight_id: doc_core::ConversationId,
    user_id: Option<doc_core::UserId>,
) -> DocResult<(String, f64)> {
    cost::check(ctx, user_id)?;

    let highlight = ctx.store.get_conversation(highlight_id)?;
    let origin_chunk = highlight.origin_chunk_id.ok_or_else(|| DocError::not_found("origin chunk"))?;
    // confirms the origin chunk still exists before summarizing.
    ctx.store.get_chunk(highlight.document_id, origin_chunk)?;
    let highlight_text = highlight.highlight_text.clone().unwrap_or_default();

    let history = ctx.store.list_messages(highlight_id)?;
    let conversation_history = history
        .iter()
        .map(|m| format!("{}: {}", role_label(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let system_prompt = ctx.prompts.summary_system();
    let user_prompt = ctx.prompts.summary_user(&highlight_text, &conversation_history);

    let model = ctx.config.chat_model_default.clone();
    let messages = vec![
        doc_adapters::ChatMessage { role: Role::System, content: system_prompt },
        doc_adapters::ChatMessage { role: Role::User, content: user_prompt },
    ];
    let completion =
        ctx.llm.chat(&model, &messages).await.map_err(|e| DocError::UpstreamLlm(e.to_string()))?;

    let chunk_context = history.first().and_then(|m| m.chunk_context).or(Some(origin_chunk));

    let summary_message = Message {
        id: MessageId::new(),
        conversation_id: main_id,
        role: Role::User,
        content: format!("Summary of highlight discussion:\n{}", completion.content),
        chunk_context,
        meta: MessageMeta { merged_from: Some(highlight_id), question_id: None },
        created_at_ms: ctx.now_ms(),
    };
    let ack_message = Message {
        id: MessageId::new(),
        conversation_id: main_id,
        role: Role::Assistant,
        content: "Acknowledged conversation merge".to_string(),
        chunk_context,
        meta: Default::default(),
        created_at_ms: ctx.now_ms(),
    };
    ctx.store.merge_into(main_id, highlight_id, summary_message, ack_message)?;

    cost::accumulate(ctx, user_id, completion.cost)?;

    Ok((completion.content, completion.cost))
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "SYSTEM",
        Role::User => "USER",
        Role::Assistant => "ASSISTANT",
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
