use std::sync::Arc;

use doc_core::{
    ChunkSeq, ConnectionId, ConversationId, ConversationKind, ConversationMeta, ContextMode, DocumentStatus, MessageMeta,
    Role,
};
use doc_storage::model::{Conversation, Document, Message, User};
use parking_lot::Mutex;

use super::*;
use crate::fixtures::{harness, TestHarness};

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
    h.ctx.store.add_chunk(id, "chunk one text".to_string()).unwrap();
    id
}

fn seed_main_conversation(h: &TestHarness, document_id: doc_core::DocumentId) -> ConversationId {
    let conversation_id = ConversationId::new();
    h.ctx
        .store
        .create_conversation(Conversation {
            id: conversation_id,
            document_id,
            kind: ConversationKind::Main,
            origin_chunk_id: None,
            highlight_text: None,
            highlight_range: None,
            meta: ConversationMeta::default(),
            is_demo: false,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::System,
                content: "system prompt".to_string(),
                chunk_context: Some(ChunkSeq(0)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();
    conversation_id
}

fn seed_highlight_conversation(h: &TestHarness, document_id: doc_core::DocumentId) -> ConversationId {
    let conversation_id = ConversationId::new();
    h.ctx
        .store
        .create_conversation(Conversation {
            id: conversation_id,
            document_id,
            kind: ConversationKind::Highlight,
            origin_chunk_id: Some(ChunkSeq(0)),
            highlight_text: Some("reality vs fiction".to_string()),
            highlight_range: Some((0, 10)),
            meta: ConversationMeta::default(),
            is_demo: false,
            created_at_ms: h.ctx.now_ms(),
        })
        .unwrap();
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::System,
                content: "highlight system prompt".to_string(),
                chunk_context: Some(ChunkSeq(0)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();
    conversation_id
}

#[test]
fn full_context_mode_concatenates_all_chunks_and_duplicates_the_current_message() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::User,
                content: "what is this about?".to_string(),
                chunk_context: Some(ChunkSeq(0)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();

    let conversation = h.ctx.store.get_conversation(conversation_id).unwrap();
    let history = h.ctx.store.list_messages(conversation_id).unwrap();
    let rendered =
        assemble_context(&h.ctx, document_id, &conversation, &history, "what is this about?", ContextMode::Full)
            .unwrap();

    assert_eq!(rendered[0].role, Role::System);
    assert!(rendered[0].content.contains("complete text"));
    assert!(rendered[0].content.contains("chunk zero text"));
    assert!(rendered[0].content.contains("chunk one text"));
    // the last stored history turn and the freshly appended current message
    // both carry the user's text (spec §4.5.2's literal full-context steps).
    let user_turns = rendered.iter().filter(|m| m.role == Role::User).count();
    assert_eq!(user_turns, 2);
    assert_eq!(rendered.last().unwrap().content, "what is this about?");
}

#[test]
fn windowed_highlight_mode_rewrites_only_the_last_message() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_highlight_conversation(&h, document_id);
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::User,
                content: "raw user text".to_string(),
                chunk_context: Some(ChunkSeq(0)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();

    let conversation = h.ctx.store.get_conversation(conversation_id).unwrap();
    let history = h.ctx.store.list_messages(conversation_id).unwrap();
    let rendered =
        assemble_context(&h.ctx, document_id, &conversation, &history, "raw user text", ContextMode::Windowed)
            .unwrap();

    assert_eq!(rendered[0].content, "highlight system prompt");
    assert!(rendered.last().unwrap().content.contains("reality vs fiction"));
    assert!(rendered.last().unwrap().content.contains("chunk zero text"));
    assert_ne!(rendered.last().unwrap().content, "raw user text");
}

#[test]
fn windowed_main_mode_compresses_a_chunk_switch() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.ctx
        .store
        .append_message(
            conversation_id,
            Message {
                id: doc_core::MessageId::new(),
                conversation_id,
                role: Role::User,
                content: "moving on".to_string(),
                chunk_context: Some(ChunkSeq(1)),
                meta: MessageMeta::default(),
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();

    let conversation = h.ctx.store.get_conversation(conversation_id).unwrap();
    let history = h.ctx.store.list_messages(conversation_id).unwrap();
    let rendered =
        assemble_context(&h.ctx, document_id, &conversation, &history, "moving on", ContextMode::Windowed).unwrap();

    assert!(rendered.iter().any(|m| m.content.contains("switched to chunks 0-1")));
    assert!(rendered.iter().any(|m| m.content.contains("chunkText")));
}

#[tokio::test]
async fn handle_message_send_persists_both_turns_and_emits_completion() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);

    let completed = Arc::new(Mutex::new(None));
    let completed2 = completed.clone();
    h.ctx.bus.on_all(move |event: DocEvent| {
        let completed2 = completed2.clone();
        async move {
            if let DocEvent::MessageSendCompleted { content, cost, .. } = event {
                *completed2.lock() = Some((content, cost));
            }
        }
    });

    let event = DocEvent::MessageSendRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
        content: "hello there".to_string(),
        conversation_kind: ConversationKind::Main,
        chunk_id: Some(ChunkSeq(0)),
        question_id: None,
        context_mode: ContextMode::Windowed,
        user_id: None,
    };
    handle_message_send(h.ctx.clone(), event).await;

    let messages = h.ctx.store.list_messages(conversation_id).unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[2].role, Role::Assistant);

    let (content, _cost) = completed.lock().clone().expect("completion emitted");
    assert_eq!(content, "hello world");
}

#[tokio::test]
async fn handle_message_send_marks_the_answered_suggested_question() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    let question_id = h
        .ctx
        .store
        .create_question(
            conversation_id,
            doc_storage::model::Question {
                id: doc_core::QuestionId::new(),
                conversation_id,
                content: "What is the thesis?".to_string(),
                meta: doc_core::QuestionMeta { chunk_id: ChunkSeq(0) },
                answered: false,
                created_at_ms: h.ctx.now_ms(),
            },
        )
        .unwrap();

    let event = DocEvent::MessageSendRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
        content: "What is the thesis?".to_string(),
        conversation_kind: ConversationKind::Main,
        chunk_id: Some(ChunkSeq(0)),
        question_id: Some(question_id),
        context_mode: ContextMode::Windowed,
        user_id: None,
    };
    handle_message_send(h.ctx.clone(), event).await;

    let questions = h.ctx.store.list_questions(conversation_id).unwrap();
    assert!(questions.iter().find(|q| q.id == question_id).unwrap().answered);
}

#[tokio::test]
async fn handle_message_send_requires_chunk_id_for_main_conversations() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);

    let errored = Arc::new(Mutex::new(false));
    let errored2 = errored.clone();
    h.ctx.bus.on_all(move |event: DocEvent| {
        let errored2 = errored2.clone();
        async move {
            if matches!(event, DocEvent::Error { kind: doc_core::DocErrorKind::Validation, .. }) {
                *errored2.lock() = true;
            }
        }
    });

    let event = DocEvent::MessageSendRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
        content: "hello".to_string(),
        conversation_kind: ConversationKind::Main,
        chunk_id: None,
        question_id: None,
        context_mode: ContextMode::Windowed,
        user_id: None,
    };
    handle_message_send(h.ctx.clone(), event).await;

    assert!(*errored.lock());
    // no user/assistant turns persisted on a rejected admission.
    assert_eq!(h.ctx.store.list_messages(conversation_id).unwrap().len(), 1);
}

#[tokio::test]
async fn handle_message_send_stops_on_cost_limit_exceeded() {
    let mut cfg = doc_core::Config::default();
    cfg.cost_limit = doc_core::CostLimit(0.0);
    let h = crate::fixtures::harness_with_config(cfg);
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    let mut user = User::new("reader@example.com", h.ctx.now_ms());
    user.cost_accum = 0.0;
    let user_id = user.id;
    h.ctx.store.create_user(user).unwrap();

    let event = DocEvent::MessageSendRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
        content: "hello".to_string(),
        conversation_kind: ConversationKind::Main,
        chunk_id: Some(ChunkSeq(0)),
        question_id: None,
        context_mode: ContextMode::Windowed,
        user_id: Some(user_id),
    };
    handle_message_send(h.ctx.clone(), event).await;

    assert_eq!(h.ctx.store.list_messages(conversation_id).unwrap().len(), 1);
}
