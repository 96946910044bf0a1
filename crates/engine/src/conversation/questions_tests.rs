use doc_core::{ChunkSeq, ConversationId, ConversationKind, ConversationMeta, ConnectionId, DocumentStatus, Role};
use doc_storage::model::{Conversation, Document, Message, MessageMeta};

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

#[tokio::test]
async fn generate_persists_one_question_per_response_line() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.llm.set_response("1. What is X?\n2. What is Y?\n\n3. What is Z?");

    let (questions, cost) =
        generate(&h.ctx, conversation_id, ConversationKind::Main, Some(ChunkSeq(0)), 3, None).await.unwrap();

    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0].content, "What is X?");
    assert_eq!(questions[1].content, "What is Y?");
    assert_eq!(questions[2].content, "What is Z?");
    assert!(!questions[0].answered);
    assert_eq!(cost, 0.01);
    assert_eq!(h.ctx.store.list_questions(conversation_id).unwrap().len(), 3);
}

#[tokio::test]
async fn generate_caps_at_the_requested_count() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.llm.set_response("one\ntwo\nthree\nfour\nfive");

    let (questions, _) =
        generate(&h.ctx, conversation_id, ConversationKind::Main, Some(ChunkSeq(0)), 2, None).await.unwrap();

    assert_eq!(questions.len(), 2);
}

#[tokio::test]
async fn regenerate_answers_the_old_batch_and_returns_a_fresh_one() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.llm.set_response("first question");
    generate(&h.ctx, conversation_id, ConversationKind::Main, Some(ChunkSeq(0)), 3, None).await.unwrap();

    h.llm.set_response("second question");
    let (fresh, _) = regenerate(&h.ctx, conversation_id, Some(ChunkSeq(0)), None).await.unwrap();

    let all = h.ctx.store.list_questions(conversation_id).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().filter(|q| q.content == "first question").all(|q| q.answered));
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].content, "second question");
    assert!(!fresh[0].answered);
}

#[tokio::test]
async fn list_generates_on_first_view_of_a_chunk_and_returns_only_unanswered() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);
    h.llm.set_response("freshly generated question");

    let (questions, cost) = list(&h.ctx, conversation_id, ChunkSeq(0), None).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].content, "freshly generated question");
    assert!(cost > 0.0);

    let conversation = h.ctx.store.get_conversation(conversation_id).unwrap();
    assert!(conversation.meta.seen_chunks.contains(&ChunkSeq(0)));

    // second view of the same chunk does not regenerate.
    h.llm.set_response("should not be generated");
    let (questions_again, cost_again) = list(&h.ctx, conversation_id, ChunkSeq(0), None).await.unwrap();
    assert_eq!(questions_again.len(), 1);
    assert_eq!(questions_again[0].content, "freshly generated question");
    assert_eq!(cost_again, 0.0);
}

#[tokio::test]
async fn handle_questions_generate_emits_completion() {
    let h = harness();
    let document_id = seed_document(&h);
    let conversation_id = seed_main_conversation(&h, document_id);

    let completed = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let completed2 = completed.clone();
    h.ctx.bus.on_all(move |event: DocEvent| {
        let completed2 = completed2.clone();
        async move {
            if let DocEvent::QuestionsGenerateCompleted { questions, .. } = event {
                *completed2.lock() = Some(questions);
            }
        }
    });

    let event = DocEvent::QuestionsGenerateRequested {
        document_id,
        connection_id: ConnectionId::new(),
        request_id: None,
        conversation_id,
        conversation_kind: ConversationKind::Main,
        chunk_id: Some(ChunkSeq(0)),
        count: 3,
        user_id: None,
    };
    handle_questions_generate(h.ctx.clone(), event).await;

    let questions = completed.lock().clone().expect("generate completed");
    assert!(!questions.is_empty());
}
