// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory, per-entity document store.
//!
//! Grounded on the teacher's `MaterializedState` (HashMap-per-entity,
//! typed accessor methods) but without its WAL/event-replay machinery:
//! nothing in the data model (§3) calls for event sourcing, so this store
//! is plain CRUD behind a single mutex rather than state derived from a
//! replayed event log. The scheduler (doc-engine) opens one "session" per
//! task by cloning the `Arc<DocStore>` handle; there is no connection pool
//! to model since everything lives in one process's memory.

use std::collections::HashMap;

use doc_core::{
    ChunkSeq, ConversationId, ConversationKind, ConversationMeta, DocError, DocResult, DocumentId,
    DocumentStatus, MessageId, QuestionId, Role, UserId,
};
use parking_lot::Mutex;

use crate::model::{Conversation, Document, DocumentChunk, Message, Question, User};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    users_by_email: HashMap<String, UserId>,
    documents: HashMap<DocumentId, Document>,
    chunks: HashMap<DocumentId, Vec<DocumentChunk>>,
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
    questions: HashMap<ConversationId, Vec<Question>>,
}

/// The document/conversation backend's sole persistence collaborator.
///
/// Cheap to clone (wraps an `Arc`-free `Mutex` behind `&self`; callers hold
/// it behind their own `Arc<DocStore>`), matching the teacher's convention
/// of passing `&MaterializedState` into handler functions rather than
/// threading a pool handle through every call.
#[derive(Debug, Default)]
pub struct DocStore {
    inner: Mutex<Inner>,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- users ------------------------------------------------------------

    pub fn create_user(&self, user: User) -> DocResult<UserId> {
        let mut inner = self.inner.lock();
        if inner.users_by_email.contains_key(&user.email) {
            return Err(DocError::validation("email: already registered"));
        }
        let id = user.id;
        inner.users_by_email.insert(user.email.clone(), id);
        inner.users.insert(id, user);
        Ok(id)
    }

    pub fn get_user(&self, id: UserId) -> DocResult<User> {
        self.inner
            .lock()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DocError::not_found("user"))
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.lock();
        inner.users_by_email.get(email).and_then(|id| inner.users.get(id)).cloned()
    }

    /// Add `delta` to the user's accumulated cost. Monotonic: `delta` must
    /// be non-negative, matching the Cost Guard's one-way ratchet (§4.8).
    pub fn accumulate_cost(&self, id: UserId, delta: f64) -> DocResult<f64> {
        if delta < 0.0 {
            return Err(DocError::Internal("negative cost delta".to_string()));
        }
        let mut inner = self.inner.lock();
        let user = inner.users.get_mut(&id).ok_or_else(|| DocError::not_found("user"))?;
        user.cost_accum += delta;
        Ok(user.cost_accum)
    }

    // -- documents ----------------------------------------------------------

    pub fn create_document(&self, document: Document) -> DocResult<DocumentId> {
        let mut inner = self.inner.lock();
        let id = document.id;
        inner.chunks.entry(id).or_default();
        inner.documents.insert(id, document);
        Ok(id)
    }

    pub fn get_document(&self, id: DocumentId) -> DocResult<Document> {
        self.inner.lock().documents.get(&id).cloned().ok_or_else(|| DocError::not_found("document"))
    }

    pub fn set_document_status(&self, id: DocumentId, status: DocumentStatus) -> DocResult<()> {
        let mut inner = self.inner.lock();
        let doc = inner.documents.get_mut(&id).ok_or_else(|| DocError::not_found("document"))?;
        doc.status = status;
        Ok(())
    }

    /// Append the next chunk. Sequences must be dense and zero-based
    /// (§3 invariant); the store enforces this rather than trusting callers.
    pub fn add_chunk(&self, document_id: DocumentId, content: String) -> DocResult<ChunkSeq> {
        let mut inner = self.inner.lock();
        if !inner.documents.contains_key(&document_id) {
            return Err(DocError::not_found("document"));
        }
        let chunks = inner.chunks.entry(document_id).or_default();
        let sequence = ChunkSeq(chunks.len() as u32);
        chunks.push(DocumentChunk { document_id, sequence, content });
        if let Some(doc) = inner.documents.get_mut(&document_id) {
            doc.chunk_count = chunks.len();
        }
        Ok(sequence)
    }

    pub fn list_chunks(&self, document_id: DocumentId) -> DocResult<Vec<DocumentChunk>> {
        self.inner
            .lock()
            .chunks
            .get(&document_id)
            .cloned()
            .ok_or_else(|| DocError::not_found("document"))
    }

    pub fn get_chunk(&self, document_id: DocumentId, sequence: ChunkSeq) -> DocResult<DocumentChunk> {
        self.inner
            .lock()
            .chunks
            .get(&document_id)
            .and_then(|chunks| chunks.get(sequence.0 as usize).cloned())
            .ok_or_else(|| DocError::not_found("chunk"))
    }

    // -- conversations ------------------------------------------------------

    pub fn create_conversation(&self, conversation: Conversation) -> DocResult<ConversationId> {
        if conversation.kind == ConversationKind::Highlight && conversation.origin_chunk_id.is_none() {
            return Err(DocError::validation("origin_chunk_id: required for highlight conversations"));
        }
        let mut inner = self.inner.lock();
        let id = conversation.id;
        inner.messages.entry(id).or_default();
        inner.questions.entry(id).or_default();
        inner.conversations.insert(id, conversation);
        Ok(id)
    }

    pub fn get_conversation(&self, id: ConversationId) -> DocResult<Conversation> {
        self.inner
            .lock()
            .conversations
            .get(&id)
            .cloned()
            .ok_or_else(|| DocError::not_found("conversation"))
    }

    pub fn list_conversations(&self, document_id: DocumentId) -> Vec<Conversation> {
        self.inner
            .lock()
            .conversations
            .values()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect()
    }

    /// Find the existing main conversation for `document_id`, if any — backs
    /// the idempotent-creation rule in §8 ("re-sending `conversation.main.create`
    /// ... returns the same id"). `demo_connection_id` narrows the match to a
    /// single connection's sandbox for example documents (§4.8); `None` means
    /// "the document's one shared main conversation".
    pub fn find_main_conversation(
        &self,
        document_id: DocumentId,
        demo_connection_id: Option<&doc_core::ConnectionId>,
    ) -> Option<Conversation> {
        self.inner
            .lock()
            .conversations
            .values()
            .find(|c| {
                c.document_id == document_id
                    && c.kind == ConversationKind::Main
                    && c.meta.connection_id.as_ref() == demo_connection_id
            })
            .cloned()
    }

    pub fn update_conversation_meta(&self, id: ConversationId, meta: ConversationMeta) -> DocResult<()> {
        let mut inner = self.inner.lock();
        let conv = inner.conversations.get_mut(&id).ok_or_else(|| DocError::not_found("conversation"))?;
        conv.meta = meta;
        Ok(())
    }

    /// Remove a demo conversation and its messages/questions, called when
    /// the owning connection disconnects (§4.7).
    pub fn delete_conversation(&self, id: ConversationId) {
        let mut inner = self.inner.lock();
        inner.conversations.remove(&id);
        inner.messages.remove(&id);
        inner.questions.remove(&id);
    }

    // -- messages -------------------------------------------------------------

    /// Append a message. The first message in any conversation must be a
    /// `System` role message (§3 invariant); enforced here so no handler can
    /// forget it.
    pub fn append_message(&self, conversation_id: ConversationId, message: Message) -> DocResult<MessageId> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(DocError::not_found("conversation"));
        }
        let history = inner.messages.entry(conversation_id).or_default();
        if history.is_empty() && message.role != Role::System {
            return Err(DocError::Internal(
                "first message in a conversation must carry the system role".to_string(),
            ));
        }
        let id = message.id;
        history.push(message);
        Ok(id)
    }

    pub fn list_messages(&self, conversation_id: ConversationId) -> DocResult<Vec<Message>> {
        self.inner
            .lock()
            .messages
            .get(&conversation_id)
            .cloned()
            .ok_or_else(|| DocError::not_found("conversation"))
    }

    /// Append the highlight→main merge's synthetic summary exchange onto the
    /// main conversation (§4.5.5). The highlight conversation is left intact
    /// so future queries can still present it; this only checks that both
    /// conversations exist and appends to `main_id`.
    pub fn merge_into(
        &self,
        main_id: ConversationId,
        highlight_id: ConversationId,
        summary_user: Message,
        summary_assistant: Message,
    ) -> DocResult<(MessageId, MessageId)> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&main_id) {
            return Err(DocError::not_found("conversation"));
        }
        if !inner.conversations.contains_key(&highlight_id) {
            return Err(DocError::not_found("conversation"));
        }
        let user_id = summary_user.id;
        let assistant_id = summary_assistant.id;
        let history = inner.messages.entry(main_id).or_default();
        history.push(summary_user);
        history.push(summary_assistant);
        Ok((user_id, assistant_id))
    }

    // -- questions --------------------------------------------------------

    pub fn create_question(&self, conversation_id: ConversationId, question: Question) -> DocResult<QuestionId> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(DocError::not_found("conversation"));
        }
        let id = question.id;
        inner.questions.entry(conversation_id).or_default().push(question);
        Ok(id)
    }

    pub fn list_questions(&self, conversation_id: ConversationId) -> DocResult<Vec<Question>> {
        self.inner
            .lock()
            .questions
            .get(&conversation_id)
            .cloned()
            .ok_or_else(|| DocError::not_found("conversation"))
    }

    pub fn replace_questions(&self, conversation_id: ConversationId, questions: Vec<Question>) -> DocResult<()> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(DocError::not_found("conversation"));
        }
        inner.questions.insert(conversation_id, questions);
        Ok(())
    }

    pub fn mark_question_answered(&self, conversation_id: ConversationId, question_id: QuestionId) -> DocResult<()> {
        let mut inner = self.inner.lock();
        let questions = inner
            .questions
            .get_mut(&conversation_id)
            .ok_or_else(|| DocError::not_found("conversation"))?;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| DocError::not_found("question"))?;
        question.answered = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
