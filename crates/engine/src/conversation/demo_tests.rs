use doc_core::{ConnectionId, ConversationKind, ConversationMeta};
use doc_storage::model::{Conversation, Document, DocumentStatus};

use super::*;
use crate::fixtures::{harness, TestHarness};

fn seed_document(h: &TestHarness) -> DocumentId {
    let id = DocumentId::new();
    h.ctx
        .store
        .create_document(Document {
            id,
            owner: None,
            title: "Example".to_string(),
            full_text: "text".to_string(),
            status: DocumentStatus::Ready,
            blob_path: None,
            chunk_count: 0,
            topic_key: None,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    id
}

fn seed_demo_conversation(h: &TestHarness, document_id: DocumentId, connection_id: ConnectionId) -> doc_core::ConversationId {
    h.ctx
        .store
        .create_conversation(Conversation {
            id: doc_core::ConversationId::new(),
            document_id,
            kind: ConversationKind::Main,
            origin_chunk_id: None,
            highlight_text: None,
            highlight_range: None,
            meta: ConversationMeta { connection_id: Some(connection_id), seen_chunks: Default::default() },
            is_demo: true,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap()
}

#[test]
fn cleanup_deletes_only_the_disconnecting_connections_conversations() {
    let h = harness();
    let document_id = seed_document(&h);
    let conn_a = ConnectionId::new();
    let conn_b = ConnectionId::new();
    let a = seed_demo_conversation(&h, document_id, conn_a.clone());
    let b = seed_demo_conversation(&h, document_id, conn_b.clone());

    cleanup(&h.ctx, document_id, &conn_a);

    assert!(h.ctx.store.get_conversation(a).is_err());
    assert!(h.ctx.store.get_conversation(b).is_ok());
}

#[test]
fn cleanup_on_a_connection_with_no_demo_conversations_is_a_no_op() {
    let h = harness();
    let document_id = seed_document(&h);
    cleanup(&h.ctx, document_id, &ConnectionId::new());
}
