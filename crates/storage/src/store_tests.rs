use doc_core::{
    ChunkSeq, ConnectionId, ConversationKind, ConversationMeta, DocumentStatus, MessageMeta, QuestionMeta, Role,
};

use super::*;
use crate::model::{Conversation, Document, Message, Question, User};

fn sample_document(store: &DocStore) -> DocumentId {
    store
        .create_document(Document {
            id: DocumentId::new(),
            owner: None,
            title: "Sample".to_string(),
            full_text: "chunk one. chunk two.".to_string(),
            status: DocumentStatus::Ready,
            blob_path: None,
            chunk_count: 0,
            topic_key: None,
            created_at_ms: 0,
        })
        .expect("create document")
}

fn sample_conversation(store: &DocStore, document_id: DocumentId) -> ConversationId {
    store
        .create_conversation(Conversation {
            id: ConversationId::new(),
            document_id,
            kind: ConversationKind::Main,
            origin_chunk_id: None,
            highlight_text: None,
            highlight_range: None,
            meta: ConversationMeta::default(),
            is_demo: false,
            created_at_ms: 0,
        })
        .expect("create conversation")
}

#[test]
fn chunk_sequences_are_dense_and_zero_based() {
    let store = DocStore::new();
    let doc_id = sample_document(&store);
    let first = store.add_chunk(doc_id, "chunk one".to_string()).unwrap();
    let second = store.add_chunk(doc_id, "chunk two".to_string()).unwrap();
    assert_eq!(first, ChunkSeq(0));
    assert_eq!(second, ChunkSeq(1));
    assert_eq!(store.get_document(doc_id).unwrap().chunk_count, 2);
}

#[test]
fn highlight_conversation_requires_origin_chunk_id() {
    let store = DocStore::new();
    let doc_id = sample_document(&store);
    let result = store.create_conversation(Conversation {
        id: ConversationId::new(),
        document_id: doc_id,
        kind: ConversationKind::Highlight,
        origin_chunk_id: None,
        highlight_text: Some("x".to_string()),
        highlight_range: Some((0, 1)),
        meta: ConversationMeta::default(),
        is_demo: false,
        created_at_ms: 0,
    });
    assert!(result.is_err());
}

#[test]
fn first_message_in_a_conversation_must_be_system() {
    let store = DocStore::new();
    let doc_id = sample_document(&store);
    let conv_id = sample_conversation(&store, doc_id);

    let bad = store.append_message(
        conv_id,
        Message {
            id: MessageId::new(),
            conversation_id: conv_id,
            role: Role::User,
            content: "hi".to_string(),
            chunk_context: None,
            meta: MessageMeta::default(),
            created_at_ms: 0,
        },
    );
    assert!(bad.is_err());

    let ok = store.append_message(
        conv_id,
        Message {
            id: MessageId::new(),
            conversation_id: conv_id,
            role: Role::System,
            content: "you are a helpful assistant".to_string(),
            chunk_context: None,
            meta: MessageMeta::default(),
            created_at_ms: 0,
        },
    );
    assert!(ok.is_ok());
}

#[test]
fn find_main_conversation_is_keyed_by_demo_connection_scope() {
    let store = DocStore::new();
    let doc_id = sample_document(&store);
    let conv_id = sample_conversation(&store, doc_id);
    assert_eq!(store.find_main_conversation(doc_id, None), Some(store.get_conversation(conv_id).unwrap()));
    assert_eq!(store.find_main_conversation(doc_id, Some(&ConnectionId::new())), None);
}

#[test]
fn cost_accumulation_is_monotonic_and_rejects_negative_deltas() {
    let store = DocStore::new();
    let user_id = store.create_user(User::new("reader@example.com", 0)).unwrap();
    assert_eq!(store.accumulate_cost(user_id, 0.10).unwrap(), 0.10);
    assert_eq!(store.accumulate_cost(user_id, 0.05).unwrap(), 0.15);
    assert!(store.accumulate_cost(user_id, -0.01).is_err());
}

#[test]
fn merge_into_appends_summary_messages_and_keeps_the_highlight_conversation() {
    let store = DocStore::new();
    let doc_id = sample_document(&store);
    let main_id = sample_conversation(&store, doc_id);
    let highlight_id = store
        .create_conversation(Conversation {
            id: ConversationId::new(),
            document_id: doc_id,
            kind: ConversationKind::Highlight,
            origin_chunk_id: Some(ChunkSeq(0)),
            highlight_text: Some("quoted text".to_string()),
            highlight_range: Some((0, 11)),
            meta: ConversationMeta::default(),
            is_demo: false,
            created_at_ms: 0,
        })
        .unwrap();

    store
        .append_message(
            main_id,
            Message {
                id: MessageId::new(),
                conversation_id: main_id,
                role: Role::System,
                content: "system".to_string(),
                chunk_context: None,
                meta: MessageMeta::default(),
                created_at_ms: 0,
            },
        )
        .unwrap();

    let user_msg = Message {
        id: MessageId::new(),
        conversation_id: main_id,
        role: Role::User,
        content: "What did the highlight discussion conclude?".to_string(),
        chunk_context: Some(ChunkSeq(0)),
        meta: MessageMeta { merged_from: Some(highlight_id), question_id: None },
        created_at_ms: 0,
    };
    let assistant_msg = Message {
        id: MessageId::new(),
        conversation_id: main_id,
        role: Role::Assistant,
        content: "It concluded X.".to_string(),
        chunk_context: Some(ChunkSeq(0)),
        meta: MessageMeta { merged_from: Some(highlight_id), question_id: None },
        created_at_ms: 0,
    };
    store.merge_into(main_id, highlight_id, user_msg, assistant_msg).unwrap();

    assert!(store.get_conversation(highlight_id).is_ok());
    let history = store.list_messages(main_id).unwrap();
    assert_eq!(history.len(), 3);
}

#[test]
fn replacing_questions_requires_an_existing_conversation() {
    let store = DocStore::new();
    let missing = ConversationId::new();
    let result = store.replace_questions(
        missing,
        vec![Question {
            id: QuestionId::new(),
            conversation_id: missing,
            content: "Why?".to_string(),
            meta: QuestionMeta { chunk_id: ChunkSeq(0) },
            answered: false,
            created_at_ms: 0,
        }],
    );
    assert!(result.is_err());
}
