// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demo conversation cleanup (spec §4.8): purges a connection's sandboxed
//! conversations once it disconnects. Not bus-registered; the daemon's
//! disconnect path calls [`cleanup`] directly, the same way the teacher's
//! connection-close handler runs inline teardown rather than emitting an
//! event for itself.

use doc_core::{ConnectionId, DocumentId};
use tracing::info;

use crate::ctx::EngineCtx;

/// Delete every demo conversation on `document_id` tagged with
/// `connection_id`. Safe to call even if the connection created none.
pub fn cleanup(ctx: &EngineCtx, document_id: DocumentId, connection_id: &ConnectionId) {
    let demo_conversations: Vec<_> = ctx
        .store
        .list_conversations(document_id)
        .into_iter()
        .filter(|c| c.is_demo && c.meta.connection_id.as_ref() == Some(connection_id))
        .collect();

    for conversation in &demo_conversations {
        ctx.store.delete_conversation(conversation.id);
    }

    if !demo_conversations.is_empty() {
        info!(%document_id, %connection_id, count = demo_conversations.len(), "demo conversations cleaned up");
    }
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;
