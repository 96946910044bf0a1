// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document View Engine (spec §4.6): four read-mostly request/response
//! pairs over a document's chunks — list, metadata, bounds-checked
//! navigation, and an idempotent processing-readiness ack. Each opens its
//! own scheduler task, mirroring [`crate::conversation`]'s handler shape.

use std::sync::Arc;

use doc_core::{ChunkSeq, ChunkView, DocEvent, DocResult, EventKind};
use tracing::info;

use crate::ctx::EngineCtx;
use crate::scheduler::Scheduler;
use crate::support::emit_error;

/// Register every document-scope handler on `scheduler`/`bus`.
pub fn register(scheduler: &Arc<Scheduler>, bus: &crate::bus::EventBus) {
    scheduler.register(bus, EventKind::DocumentChunkListRequested, handler(handle_chunk_list));
    scheduler.register(bus, EventKind::DocumentMetadataRequested, handler(handle_metadata));
    scheduler.register(bus, EventKind::DocumentNavigationRequested, handler(handle_navigation));
    scheduler.register(bus, EventKind::DocumentProcessingRequested, handler(handle_processing));
}

pub async fn handle_chunk_list(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::DocumentChunkListRequested { document_id, connection_id, request_id } = event else {
        return;
    };

    let result: DocResult<Vec<ChunkView>> = ctx
        .store
        .list_chunks(document_id)
        .map(|chunks| chunks.into_iter().map(|c| ChunkView { sequence: c.sequence, content: c.content }).collect());

    match result {
        Ok(chunks) => {
            info!(%document_id, count = chunks.len(), "chunks listed");
            let _ = ctx.bus.emit(DocEvent::DocumentChunkListCompleted { document_id, connection_id, request_id, chunks });
        }
        Err(err) => {
            emit_error(&ctx.bus, document_id, connection_id, request_id, EventKind::DocumentChunkListRequested, err)
        }
    }
}

pub async fn handle_metadata(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::DocumentMetadataRequested { document_id, connection_id, request_id } = event else {
        return;
    };

    let result: DocResult<(String, usize, Vec<ChunkView>)> = (|| {
        let document = ctx.store.get_document(document_id)?;
        let chunks = ctx
            .store
            .list_chunks(document_id)?
            .into_iter()
            .map(|c| ChunkView { sequence: c.sequence, content: c.content })
            .collect::<Vec<_>>();
        Ok((document.title, chunks.len(), chunks))
    })();

    match result {
        Ok((title, chunk_count, chunks)) => {
            info!(%document_id, chunk_count, "metadata returned");
            let _ = ctx.bus.emit(DocEvent::DocumentMetadataCompleted {
                document_id,
                connection_id,
                request_id,
                title,
                chunk_count,
                chunks,
            });
        }
        Err(err) => {
            emit_error(&ctx.bus, document_id, connection_id, request_id, EventKind::DocumentMetadataRequested, err)
        }
    }
}

pub async fn handle_navigation(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::DocumentNavigationRequested { document_id, connection_id, request_id, index } = event else {
        return;
    };

    let result: DocResult<(ChunkSeq, Option<ChunkSeq>, Option<ChunkSeq>)> = (|| {
        let chunks = ctx.store.list_chunks(document_id)?;
        if index < 0 || index as usize >= chunks.len() {
            return Err(doc_core::DocError::validation("index"));
        }
        let index = index as usize;
        let current = chunks[index].sequence;
        let prev = index.checked_sub(1).map(|i| chunks[i].sequence);
        let next = chunks.get(index + 1).map(|c| c.sequence);
        Ok((current, prev, next))
    })();

    match result {
        Ok((current, prev, next)) => {
            info!(%document_id, %current, "navigation resolved");
            let _ = ctx.bus.emit(DocEvent::DocumentNavigationCompleted {
                document_id,
                connection_id,
                request_id,
                current,
                prev,
                next,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::DocumentNavigationRequested,
            err,
        ),
    }
}

/// Idempotent ack that the document is ready. Never mutates state.
pub async fn handle_processing(ctx: EngineCtx, event: DocEvent) {
    let DocEvent::DocumentProcessingRequested { document_id, connection_id, request_id } = event else {
        return;
    };

    match ctx.store.get_document(document_id) {
        Ok(document) => {
            info!(%document_id, status = ?document.status, "processing ack");
            let _ = ctx.bus.emit(DocEvent::DocumentProcessingCompleted {
                document_id,
                connection_id,
                request_id,
                status: document.status,
            });
        }
        Err(err) => emit_error(
            &ctx.bus,
            document_id,
            connection_id,
            request_id,
            EventKind::DocumentProcessingRequested,
            err,
        ),
    }
}

fn handler<F, Fut>(f: F) -> crate::scheduler::Handler
where
    F: Fn(EngineCtx, DocEvent) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx, event| Box::pin(f(ctx, event)))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
