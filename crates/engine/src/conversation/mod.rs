// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation Engine (spec §4.5): creation, message send and context
//! assembly, question lifecycle, highlight→main merge, and listings.
//!
//! Each submodule owns one or two scheduler-registered handlers; [`register`]
//! wires all of them onto a [`Scheduler`] in one place, mirroring how
//! `oj-engine::runtime` registers its job-lifecycle handlers from a single
//! composition function.

pub mod chunk_switch;
pub mod create;
pub mod demo;
pub mod list;
pub mod merge;
pub mod message;
pub mod questions;

use std::sync::Arc;

use doc_core::EventKind;

use crate::scheduler::Scheduler;

/// Register every conversation-scope handler on `scheduler`/`bus`.
pub fn register(scheduler: &Arc<Scheduler>, bus: &crate::bus::EventBus) {
    scheduler.register(bus, EventKind::ConversationMainCreateRequested, handler(create::handle_main_create));
    scheduler.register(bus, EventKind::ConversationChunkCreateRequested, handler(create::handle_chunk_create));
    scheduler.register(bus, EventKind::ConversationMessageSendRequested, handler(message::handle_message_send));
    scheduler.register(
        bus,
        EventKind::ConversationQuestionsGenerateRequested,
        handler(questions::handle_questions_generate),
    );
    scheduler.register(
        bus,
        EventKind::ConversationQuestionsRegenerateRequested,
        handler(questions::handle_questions_regenerate),
    );
    scheduler.register(
        bus,
        EventKind::ConversationQuestionsListRequested,
        handler(questions::handle_questions_list),
    );
    scheduler.register(bus, EventKind::ConversationMergeRequested, handler(merge::handle_merge));
    scheduler.register(bus, EventKind::ConversationListRequested, handler(list::handle_list));
    scheduler.register(bus, EventKind::ConversationMessagesRequested, handler(list::handle_messages_get));
    scheduler.register(bus, EventKind::ConversationChunkGetRequested, handler(list::handle_chunk_get));
}

/// Adapt an `async fn(EngineCtx, DocEvent)` into the boxed-future shape the
/// scheduler's `Handler` type requires.
fn handler<F, Fut>(f: F) -> crate::scheduler::Handler
where
    F: Fn(crate::ctx::EngineCtx, doc_core::DocEvent) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx, event| Box::pin(f(ctx, event)))
}
