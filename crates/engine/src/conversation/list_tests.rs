use std::collections::HashSet;

use doc_core::{ChunkSeq, Config, ConnectionId, ConversationId, ConversationKind, ConversationMeta, DocumentStatus, Role};
use doc_storage::model::{Conversation, Document, Message, MessageMeta};

use super::*;
use crate::fixtures::{harness, harness_with_config, TestHarness};

fn seed_document(h: &TestHarness) -> doc_core::DocumentId {
    let id = doc_core::DocumentId::new();
    h.ctx
        .store
        .create_document(Document {
            id,
            owner: None,
            title: "Sample".to_string(),
            full_text: "chunk zero text".to_string(),
            status: DocumentStatus::Ready,
            blob_path: None,
            chunk_count: 0,
            topic_key: None,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    h.ctx.store.add_chunk(id, "chunk zero text".to_string()).unwrap();
    id
}

fn seed_conversation(
    h: &TestHarness,
    document_id: doc_core::DocumentId,
    origin_chunk_id: Option<ChunkSeq>,
    is_demo: bool,
    connection_id: Option<ConnectionId>,
) -> ConversationId {
    let id = ConversationId::new();
    h.ctx
        .store
        .create_conversation(Conversation {
            id,
            document_id,
            kind: if origin_chunk_id.is_some() { ConversationKind::Highlight } else { ConversationKind::Main },
            origin_chunk_id,
            highlight_text: origin_chunk_id.map(|_| "quoted".to_string()),
            highlight_range: origin_chunk_id.map(|_| (0, 5)),
            meta: ConversationMeta { connection_id, seen_chunks: Default::default() },
            is_demo,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    h.ctx
        .store
        .append_message(
            id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id: id,
                role: Role::System,
                content: "system".to_string(),
                chunk_context: origin_chunk_id,
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();
    id
}

#[test]
fn list_returns_every_conversation_for_a_non_demo_document() {
    let h = harness();
    let document_id = seed_document(&h);
    let a = seed_conversation(&h, document_id, None, false, None);
    let b = seed_conversation(&h, document_id, Some(ChunkSeq(0)), false, None);

    let connection_id = ConnectionId::new();
    let conversations = list(&h.ctx, document_id, &connection_id).unwrap();
    let ids: HashSet<_> = conversations.iter().map(|c| c.id).collect();
    assert_eq!(ids, HashSet::from([a, b]));
}

#[test]
fn list_scopes_demo_documents_to_the_requesting_connection() {
    let mut example_document_ids = HashSet::new();
    let document_id = doc_core::DocumentId::new();
    example_document_ids.insert(document_id);
    let config = Config { example_document_ids, ..Config::default() };
    let h = harness_with_config(config);
    h.ctx
        .store
        .create_document(Document {
            id: document_id,
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
    h.ctx.store.add_chunk(document_id, "text".to_string()).unwrap();

    let conn_a = ConnectionId::new();
    let conn_b = ConnectionId::new();
    let a = seed_conversation(&h, document_id, None, true, Some(conn_a.clone()));
    let _b = seed_conversation(&h, document_id, None, true, Some(conn_b));

    let conversations = list(&h.ctx, document_id, &conn_a).unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, a);
}

#[tokio::test]
async fn handle_chunk_get_returns_conversations_anchored_to_the_sequence() {
    let h = harness();
    let document_id = seed_document(&h);
    let highlight_id = seed_conversation(&h, document_id, Some(ChunkSeq(0)), false, None);
    let _main_id = seed_conversation(&h, document_id, None, false, None);

    let completed = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let completed2 = completed.clone();
    h.ctx.bus.on_all(move |event: DocEvent| {
        let completed2 = completed2.clone();
        async move {
            if let DocEvent::ChunkGetCompleted { conversations, .. } = event {
                *completed2.lock() = Some(conversations);
            }
        }
    });

    let event = DocEvent::ChunkGetRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        sequence_number: ChunkSeq(0),
    };
    handle_chunk_get(h.ctx.clone(), event).await;

    let conversations = completed.lock().clone().expect("chunk.get completed");
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, highlight_id);
    assert_eq!(conversations[0].highlight_text.as_deref(), Some("quoted"));
}

#[tokio::test]
async fn handle_messages_get_returns_history_in_creation_order() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_conversation(&h, document_id, None, false, None);
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::User,
                content: "hello".to_string(),
                chunk_context: Some(ChunkSeq(0)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();

    let completed = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let completed2 = completed.clone();
    h.ctx.bus.on_all(move |event: DocEvent| {
        let completed2 = completed2.clone();
        async move {
            if let DocEvent::MessagesCompleted { messages, .. } = event {
                *completed2.lock() = Some(messages);
            }
        }
    });

    let event = DocEvent::MessagesRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
    };
    handle_messages_get(h.ctx.clone(), event).await;

    let messages = completed.lock().clone().expect("messages completed");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].content, "hello");
}
