use super::*;
use crate::fixtures::harness;
use doc_core::{ChunkSeq, ConnectionId, DocumentId, DocumentStatus};
use doc_storage::model::Document;

fn seed_document(h: &crate::fixtures::TestHarness) -> DocumentId {
    let id = DocumentId::new();
    h.ctx
        .store
        .create_document(Document {
            id,
            owner: None,
            title: "Report".to_string(),
            full_text: "one two three".to_string(),
            status: DocumentStatus::Ready,
            blob_path: None,
            chunk_count: 0,
            topic_key: None,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    h.ctx.store.add_chunk(id, "one".to_string()).unwrap();
    h.ctx.store.add_chunk(id, "two".to_string()).unwrap();
    h.ctx.store.add_chunk(id, "three".to_string()).unwrap();
    id
}

fn collect_one(bus: &crate::bus::EventBus) -> Arc<parking_lot::Mutex<Option<DocEvent>>> {
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let seen2 = Arc::clone(&seen);
    bus.on_all(move |event: DocEvent| {
        let seen2 = Arc::clone(&seen2);
        async move {
            *seen2.lock() = Some(event);
        }
    });
    seen
}

#[tokio::test]
async fn chunk_list_returns_every_chunk_in_order() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_chunk_list(
        h.ctx.clone(),
        DocEvent::DocumentChunkListRequested { document_id, connection_id, request_id: None },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::DocumentChunkListCompleted { chunks, .. }) => {
            assert_eq!(chunks.len(), 3);
            assert_eq!(chunks[0].content, "one");
            assert_eq!(chunks[2].sequence, ChunkSeq(2));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn metadata_reports_title_and_chunk_count() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_metadata(
        h.ctx.clone(),
        DocEvent::DocumentMetadataRequested { document_id, connection_id, request_id: None },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::DocumentMetadataCompleted { title, chunk_count, chunks, .. }) => {
            assert_eq!(title, "Report");
            assert_eq!(chunk_count, 3);
            assert_eq!(chunks.len(), 3);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn navigation_out_of_bounds_is_an_error() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_navigation(
        h.ctx.clone(),
        DocEvent::DocumentNavigationRequested { document_id, connection_id, request_id: None, index: 99 },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::Error { kind, .. }) => assert_eq!(kind, doc_core::DocErrorKind::Validation),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn navigation_reports_neighbors_for_a_middle_chunk() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_navigation(
        h.ctx.clone(),
        DocEvent::DocumentNavigationRequested { document_id, connection_id, request_id: None, index: 1 },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::DocumentNavigationCompleted { current, prev, next, .. }) => {
            assert_eq!(current, ChunkSeq(1));
            assert_eq!(prev, Some(ChunkSeq(0)));
            assert_eq!(next, Some(ChunkSeq(2)));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn navigation_at_first_chunk_has_no_prev() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_navigation(
        h.ctx.clone(),
        DocEvent::DocumentNavigationRequested { document_id, connection_id, request_id: None, index: 0 },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::DocumentNavigationCompleted { prev, .. }) => assert_eq!(prev, None),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn processing_ack_reports_document_status() {
    let h = harness();
    let document_id = seed_document(&h);
    let connection_id = ConnectionId::new();
    let seen = collect_one(&h.ctx.bus);

    handle_processing(
        h.ctx.clone(),
        DocEvent::DocumentProcessingRequested { document_id, connection_id, request_id: None },
    )
    .await;

    match seen.lock().take() {
        Some(DocEvent::DocumentProcessingCompleted { status, .. }) => {
            assert_eq!(status, DocumentStatus::Ready)
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
