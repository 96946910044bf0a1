// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suggested-question lifecycle (spec §4.5.4): generation, regeneration, and
//! the seen-chunks-gated listing that auto-generates on a chunk's first view.

use doc_core::{ChunkSeq, ConversationKind, DocEvent, DocError, DocResult, EventKind, QuestionId};
use doc_storage::model::Question;
use tracing::info;

use crate::cost;
use crate::ctx::EngineCtx;
use crate::support::emit_error;

const DEFAULT_COUNT: u32 = 3;
const ENUMERATION_MARKERS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '.', '*', ')', ' '];

pub async fn handle_questions_generate(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::QuestionsGenerateRequested {
        document_id,
        connection_id,
        request_id,
        conversation_id,
        conversation_kind,
        chunk_id,
        count,
        user_id,
    } = event
    else {
        return;
    };

    let result = generate(&ctx, conversation_id, conversation_kind, chunk_id, count, user_id).await;
    match result {
        Ok((questions, cost)) => {
            info!(%document_id, %conversation_id, "questions generated");
            let _ = ctx.bus.emit(DocEvent::QuestionsGenerateCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                questions: questions.iter().map(view).collect(),
                cost,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationQuestionsGenerateRequested,
            err,
        ),
    }
}

pub async fn handle_questions_regenerate(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::QuestionsRegenerateRequested { document_id, connection_id, request_id, conversation_id, chunk_id, user_id } =
        event
    else {
        return;
    };

    let result = regenerate(&ctx, conversation_id, chunk_id, user_id).await;
    match result {
        Ok((questions, cost)) => {
            info!(%document_id, %conversation_id, "questions regenerated");
            let _ = ctx.bus.emit(DocEvent::QuestionsRegenerateCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                questions: questions.iter().map(view).collect(),
                cost,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationQuestionsRegenerateRequested,
            err,
        ),
    }
}

pub async fn handle_questions_list(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::QuestionsListRequested { document_id, connection_id, request_id, conversation_id, chunk_id, user_id } =
        event
    else {
        return;
    };

    let result = list(&ctx, conversation_id, chunk_id, user_id).await;
    match result {
        Ok((questions, cost)) => {
            info!(%document_id, %conversation_id, "questions listed");
            let _ = ctx.bus.emit(DocEvent::QuestionsListCompleted {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                questions: questions.iter().map(view).collect(),
                cost,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::ConversationQuestionsListRequested,
            err,
        ),
    }
}

fn view(q: &Question) -> doc_core::QuestionView {
    doc_core::QuestionView { id: q.id, content: q.content.clone(), chunk_id: q.meta.chunk_id, answered: q.answered }
}

async fn generate(
    ctx: &EngineCtx,
    conversation_id: doc_core::ConversationId,
    conversation_kind: ConversationKind,
    chunk_id: Option<ChunkSeq>,
    count: u32,
    user_id: Option<doc_core::UserId>,
) -> DocResult<(Vec<Question>, f64)> {
    cost::check(ctx, user_id)?;

    let conversation = ctx.store.get_conversation(conversation_id)?;
    let chunk_id = chunk_id.or(conversation.origin_chunk_id).ok_or_else(|| DocError::validation("chunk_id"))?;
    let chunk = ctx.store.get_chunk(conversation.document_id, chunk_id)?;
    let count = if count == 0 { DEFAULT_COUNT } else { count };

    let previous = ctx
        .store
        .list_questions(conversation_id)?
        .into_iter()
        .filter(|q| q.meta.chunk_id == chunk_id)
        .map(|q| q.content)
        .collect::<Vec<_>>()
        .join("\n");

    let (system_prompt, user_prompt) = match conversation_kind {
        ConversationKind::Highlight => {
            let highlight_text = conversation.highlight_text.clone().unwrap_or_default();
            (ctx.prompts.question_system(), ctx.prompts.question_highlight(count, &highlight_text, &previous))
        }
        ConversationKind::Main => {
            (ctx.prompts.question_system(), ctx.prompts.question_main(count, &chunk.content, &previous))
        }
    };

    let model = ctx.config.chat_model_default.clone();
    let messages = vec![
        doc_adapters::ChatMessage { role: doc_core::Role::System, content: system_prompt },
        doc_adapters::ChatMessage { role: doc_core::Role::User, content: user_prompt },
    ];
    let completion =
        ctx.llm.chat(&model, &messages).await.map_err(|e| DocError::UpstreamLlm(e.to_string()))?;

    let questions: Vec<Question> = completion
        .content
        .lines()
        .map(|line| line.trim().trim_start_matches(ENUMERATION_MARKERS).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(count as usize)
        .map(|content| Question {
            id: QuestionId::new(),
            conversation_id,
            content,
            meta: doc_core::QuestionMeta { chunk_id },
            answered: false,
            created_at_ms: ctx.now_ms(),
        })
        .collect();

    for question in &questions {
        ctx.store.create_question(conversation_id, question.clone())?;
    }

    if let Some(user_id) = user_id {
        cost::accumulate(ctx, Some(user_id), completion.cost)?;
    }

    Ok((questions, completion.cost))
}

async fn regenerate(
    ctx: &EngineCtx,
    conversation_id: doc_core::ConversationId,
    chunk_id: Option<ChunkSeq>,
    user_id: Option<doc_core::UserId>,
) -> DocResult<(Vec<Question>, f64)> {
    let conversation = ctx.store.get_conversation(conversation_id)?;
    let mut existing = ctx.store.list_questions(conversation_id)?;
    for question in &mut existing {
        question.answered = true;
    }
    ctx.store.replace_questions(conversation_id, existing)?;

    generate(ctx, conversation_id, conversation.kind, chunk_id, DEFAULT_COUNT, user_id).await
}

async fn list(
    ctx: &EngineCtx,
    conversation_id: doc_core::ConversationId,
    chunk_id: ChunkSeq,
    user_id: Option<doc_core::UserId>,
) -> DocResult<(Vec<Question>, f64)> {
    let conversation = ctx.store.get_conversation(conversation_id)?;
    let mut cost = 0.0;

    if !conversation.meta.seen_chunks.contains(&chunk_id) {
        let mut meta = conversation.meta.clone();
        meta.seen_chunks.insert(chunk_id);
        ctx.store.update_conversation_meta(conversation_id, meta)?;

        let (_, generated_cost) =
            generate(ctx, conversation_id, conversation.kind, Some(chunk_id), DEFAULT_COUNT, user_id).await?;
        cost = generated_cost;
    }

    let questions = ctx
        .store
        .list_questions(conversation_id)?
        .into_iter()
        .filter(|q| q.meta.chunk_id == chunk_id && !q.answered)
        .collect();

    Ok((questions, cost))
}

#[cfg(test)]
#[path = "questions_tests.rs"]
mod tests;
