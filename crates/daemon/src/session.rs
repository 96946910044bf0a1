// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Handlers (spec §4.3): translate inbound client frames into
//! Request Events on the bus, and the Connection Registry's outbound
//! events back into client frames.
//!
//! Grounded on the teacher's `ws.rs` event bridge: one task per connection,
//! a `tokio::select!` loop reading frames off the socket on one arm and
//! draining a channel on the other, rather than splitting into two tracked
//! tasks — `WebSocketStream` is both a `Stream` and a `Sink` on the same
//! value, so there is nothing to split here.

use std::sync::Arc;

use doc_adapters::Principal;
use doc_core::{
    ChunkView, ConnectionId, ContextMode, ConversationView, DocErrorKind, DocEvent, DocumentId,
    EventKind, MessageView, QuestionView, RequestId,
};
use doc_wire::{
    decode_conversation_frame, decode_document_frame, ChunkSummary, ConversationRequest,
    ConversationSummary, DocumentRequest, MessageSummary, OutboundEnvelope, OutboundFrame,
    QuestionSummary,
};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;
use tracing::{info, warn};

use crate::core::DaemonCore;
use crate::registry::Scope;

/// Close code used when a connection is unauthorized or names a document
/// that doesn't exist (§4.3, §6).
pub const CLOSE_UNAUTHORIZED: u16 = 4003;

const CONVERSATION_EVENT_KINDS: &[EventKind] = &[
    EventKind::ConversationMainCreateCompleted,
    EventKind::ConversationMainCreateError,
    EventKind::ConversationChunkCreateCompleted,
    EventKind::ConversationChunkCreateError,
    EventKind::ConversationMessageSendCompleted,
    EventKind::ConversationMessageSendError,
    EventKind::ChatToken,
    EventKind::ConversationQuestionsGenerateCompleted,
    EventKind::ConversationQuestionsGenerateError,
    EventKind::ConversationQuestionsRegenerateCompleted,
    EventKind::ConversationQuestionsRegenerateError,
    EventKind::ConversationQuestionsListCompleted,
    EventKind::ConversationQuestionsListError,
    EventKind::ConversationMergeCompleted,
    EventKind::ConversationMergeError,
    EventKind::ConversationListCompleted,
    EventKind::ConversationListError,
    EventKind::ConversationMessagesCompleted,
    EventKind::ConversationMessagesError,
    EventKind::ConversationChunkGetCompleted,
    EventKind::ConversationChunkGetError,
    EventKind::DocumentChunkListCompleted,
    EventKind::DocumentChunkListError,
];

const DOCUMENT_EVENT_KINDS: &[EventKind] = &[
    EventKind::DocumentChunkListCompleted,
    EventKind::DocumentChunkListError,
    EventKind::DocumentMetadataCompleted,
    EventKind::DocumentMetadataError,
    EventKind::DocumentNavigationCompleted,
    EventKind::DocumentNavigationError,
    EventKind::DocumentProcessingCompleted,
    EventKind::DocumentProcessingError,
];

/// Authorize a connection attempt (spec §4.3): any (or no) principal may
/// connect to a document in the example set; otherwise the resolved
/// principal must own the document.
fn authorize(core: &DaemonCore, document_id: DocumentId, principal: &Principal) -> Result<(), ()> {
    if core.config.example_document_ids.contains(&document_id) {
        return Ok(());
    }
    let Ok(document) = core.ctx.store.get_document(document_id) else {
        return Err(());
    };
    match (principal, document.owner) {
        (Principal::User(uid), Some(owner)) if *uid == owner => Ok(()),
        _ => Err(()),
    }
}

async fn close_unauthorized<S>(socket: &mut WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _ = socket
        .close(Some(CloseFrame {
            code: CloseCode::from(CLOSE_UNAUTHORIZED),
            reason: "unauthorized or missing document".into(),
        }))
        .await;
}

/// Close a socket whose upgrade path didn't match either endpoint in §6's
/// table. Distinct from [`close_unauthorized`]: the document id was never
/// even parsed, so there's nothing to authorize against.
pub async fn reject_unrecognized_path<S>(socket: &mut WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _ = socket
        .close(Some(CloseFrame {
            code: CloseCode::from(CLOSE_UNAUTHORIZED),
            reason: "unrecognized stream path".into(),
        }))
        .await;
}

/// Run the `conversation` scope session for one accepted socket until it
/// closes, then unregister the connection and run demo cleanup (§4.8).
pub async fn run_conversation_session<S>(
    core: Arc<DaemonCore>,
    mut socket: WebSocketStream<S>,
    document_id: DocumentId,
    principal: Principal,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    if authorize(&core, document_id, &principal).is_err() {
        close_unauthorized(&mut socket).await;
        return;
    }

    let connection_id = ConnectionId::new();
    let user_id = match &principal {
        Principal::User(uid) => Some(*uid),
        Principal::Anonymous => None,
    };

    let mut rx =
        core.registry.connect(connection_id.clone(), document_id, Scope::Conversation, core.per_conn_queue_capacity());
    core.registry.subscribe_many(&connection_id, CONVERSATION_EVENT_KINDS.iter().copied());

    info!(%connection_id, %document_id, "conversation session connected");

    loop {
        tokio::select! {
            biased;
            incoming = rx.recv() => {
                let Some(event) = incoming else { break };
                let request_id = event.request_id();
                for frame in translate_conversation_event(event) {
                    let envelope = OutboundEnvelope { frame, request_id: request_id.clone() };
                    if socket.send(WsMessage::Text(envelope.to_json().into())).await.is_err() {
                        break;
                    }
                }
            }
            frame = socket.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        match decode_conversation_frame(&text) {
                            Ok((request, request_id)) => {
                                let event = conversation_event_from_request(document_id, connection_id.clone(), request_id, user_id, request);
                                if let Err(err) = core.bus.emit(event) {
                                    warn!(%connection_id, ?err, "failed to emit request event");
                                }
                            }
                            Err(err) => {
                                let envelope = decode_error_response(&text, &err);
                                let _ = socket.send(WsMessage::Text(envelope.to_json().into())).await;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary frames carry no request
                    Some(Err(err)) => {
                        warn!(%connection_id, %err, "conversation socket error");
                        break;
                    }
                }
            }
        }
    }

    core.registry.disconnect(&connection_id, document_id, Scope::Conversation);
    doc_engine::conversation::demo::cleanup(&core.ctx, document_id, &connection_id);
    info!(%connection_id, %document_id, "conversation session disconnected");
}

/// Run the `document` scope session for one accepted socket until it closes
/// (§4.3, §4.6). No demo-cleanup side effect: only conversation-scope
/// disconnects trigger that (§4.8).
pub async fn run_document_session<S>(
    core: Arc<DaemonCore>,
    mut socket: WebSocketStream<S>,
    document_id: DocumentId,
    principal: Principal,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    if authorize(&core, document_id, &principal).is_err() {
        close_unauthorized(&mut socket).await;
        return;
    }

    let connection_id = ConnectionId::new();
    let mut rx =
        core.registry.connect(connection_id.clone(), document_id, Scope::Document, core.per_conn_queue_capacity());
    core.registry.subscribe_many(&connection_id, DOCUMENT_EVENT_KINDS.iter().copied());

    info!(%connection_id, %document_id, "document session connected");

    loop {
        tokio::select! {
            biased;
            incoming = rx.recv() => {
                let Some(event) = incoming else { break };
                let request_id = event.request_id();
                if let Some(frame) = translate_document_event(event) {
                    let envelope = OutboundEnvelope { frame, request_id };
                    if socket.send(WsMessage::Text(envelope.to_json().into())).await.is_err() {
                        break;
                    }
                }
            }
            frame = socket.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        match decode_document_frame(&text) {
                            Ok((request, request_id)) => {
                                let event = document_event_from_request(document_id, connection_id.clone(), request_id, request);
                                if let Err(err) = core.bus.emit(event) {
                                    warn!(%connection_id, ?err, "failed to emit request event");
                                }
                            }
                            Err(err) => {
                                let envelope = decode_error_response(&text, &err);
                                let _ = socket.send(WsMessage::Text(envelope.to_json().into())).await;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(%connection_id, %err, "document socket error");
                        break;
                    }
                }
            }
        }
    }

    core.registry.disconnect(&connection_id, document_id, Scope::Document);
    info!(%connection_id, %document_id, "document session disconnected");
}

fn conversation_event_from_request(
    document_id: DocumentId,
    connection_id: ConnectionId,
    request_id: Option<RequestId>,
    user_id: Option<doc_core::UserId>,
    request: ConversationRequest,
) -> DocEvent {
    match request {
        ConversationRequest::MainCreate { chunk_id } => {
            DocEvent::MainCreateRequested { document_id, connection_id, request_id, chunk_id, user_id }
        }
        ConversationRequest::ChunkCreate { chunk_id, highlight_range, highlight_text } => {
            DocEvent::ChunkCreateRequested {
                document_id,
                connection_id,
                request_id,
                chunk_id,
                highlight_range,
                highlight_text,
                user_id,
            }
        }
        ConversationRequest::MessageSend {
            conversation_id,
            content,
            conversation_type,
            chunk_id,
            question_id,
            use_full_context,
        } => DocEvent::MessageSendRequested {
            document_id,
            connection_id,
            request_id,
            conversation_id,
            content,
            conversation_kind: conversation_type,
            chunk_id,
            question_id,
            context_mode: if use_full_context { ContextMode::Full } else { ContextMode::Windowed },
            user_id,
        },
        ConversationRequest::QuestionsGenerate { conversation_id, conversation_type, count, chunk_id } => {
            DocEvent::QuestionsGenerateRequested {
                document_id,
                connection_id,
                request_id,
                conversation_id,
                conversation_kind: conversation_type,
                chunk_id,
                count: count.unwrap_or(3),
                user_id,
            }
        }
        ConversationRequest::QuestionsRegenerate { conversation_id, chunk_id } => {
            DocEvent::QuestionsRegenerateRequested { document_id, connection_id, request_id, conversation_id, chunk_id, user_id }
        }
        ConversationRequest::ChunkMerge { main_conversation_id, highlight_conversation_id } => DocEvent::MergeRequested {
            document_id,
            connection_id,
            request_id,
            main_conversation_id,
            highlight_conversation_id,
            user_id,
        },
        ConversationRequest::List => DocEvent::ListRequested { document_id, connection_id, request_id },
        ConversationRequest::MessagesGet { conversation_id } => {
            DocEvent::MessagesRequested { document_id, connection_id, request_id, conversation_id }
        }
        ConversationRequest::GetBySequence { sequence_number } => {
            DocEvent::ChunkGetRequested { document_id, connection_id, request_id, sequence_number }
        }
        ConversationRequest::DocumentChunkList => {
            DocEvent::DocumentChunkListRequested { document_id, connection_id, request_id }
        }
    }
}

fn document_event_from_request(
    document_id: DocumentId,
    connection_id: ConnectionId,
    request_id: Option<RequestId>,
    request: DocumentRequest,
) -> DocEvent {
    match request {
        DocumentRequest::MetadataGet => DocEvent::DocumentMetadataRequested { document_id, connection_id, request_id },
        DocumentRequest::ChunkList => DocEvent::DocumentChunkListRequested { document_id, connection_id, request_id },
        DocumentRequest::Navigation { index } => {
            DocEvent::DocumentNavigationRequested { document_id, connection_id, request_id, index }
        }
        DocumentRequest::Processing => DocEvent::DocumentProcessingRequested { document_id, connection_id, request_id },
    }
}

/// Project a completion/error `DocEvent` into the outbound frame(s) it
/// produces. `MessageSendCompleted` is the one case that fans out to two
/// frames: `chat.completed` carries the full assistant text (§4.5.2 step 4)
/// and `conversation.message.send.completed` carries the persisted message
/// plus cost (§4.5.2 step 8) — the engine only ever emits the one
/// completion event, and the wire-level duplication happens here.
fn translate_conversation_event(event: DocEvent) -> Vec<OutboundFrame> {
    use DocEvent::*;
    match event {
        MainCreateCompleted { conversation_id, .. } => vec![OutboundFrame::MainCreateCompleted { conversation_id }],
        ChunkCreateCompleted { conversation_id, .. } => vec![OutboundFrame::ChunkCreateCompleted { conversation_id }],
        MessageSendCompleted { conversation_id, content, cost, .. } => vec![
            OutboundFrame::ChatCompleted { conversation_id, content: content.clone() },
            OutboundFrame::MessageSendCompleted { message: content, conversation_id, cost },
        ],
        ChatToken { conversation_id, token, .. } => vec![OutboundFrame::ChatToken { conversation_id, token }],
        QuestionsGenerateCompleted { questions, cost, .. } => {
            vec![OutboundFrame::QuestionsGenerateCompleted { questions: question_summaries(questions), cost }]
        }
        QuestionsRegenerateCompleted { questions, cost, .. } => {
            vec![OutboundFrame::QuestionsRegenerateCompleted { questions: question_summaries(questions), cost }]
        }
        QuestionsListCompleted { questions, .. } => {
            vec![OutboundFrame::QuestionsListCompleted { questions: question_summaries(questions) }]
        }
        MergeCompleted { main_conversation_id, highlight_conversation_id, summary, cost, .. } => {
            vec![OutboundFrame::MergeCompleted { main_id: main_conversation_id, highlight_id: highlight_conversation_id, summary, cost }]
        }
        ListCompleted { conversations, .. } => {
            vec![OutboundFrame::ListCompleted { conversations: conversation_summaries(conversations) }]
        }
        MessagesCompleted { messages, .. } => {
            vec![OutboundFrame::MessagesCompleted { messages: message_summaries(messages) }]
        }
        ChunkGetCompleted { conversations, .. } => {
            vec![OutboundFrame::ChunkGetCompleted { conversations: conversation_summaries(conversations) }]
        }
        DocumentChunkListCompleted { chunks, .. } => {
            vec![OutboundFrame::DocumentChunkListCompleted { chunks: chunk_summaries(chunks) }]
        }
        Error { in_reply_to, kind, message, user_cost, limit, field, .. } => {
            vec![OutboundFrame::Error { in_reply_to: wire_type_name(in_reply_to), kind, message, user_cost, limit, field }]
        }
        // Requested events never reach a session: they're consumed by the
        // scheduler, not re-dispatched to a connection.
        _ => vec![],
    }
}

fn translate_document_event(event: DocEvent) -> Option<OutboundFrame> {
    use DocEvent::*;
    match event {
        DocumentChunkListCompleted { chunks, .. } => {
            Some(OutboundFrame::DocumentChunkListCompleted { chunks: chunk_summaries(chunks) })
        }
        DocumentMetadataCompleted { document_id, title, chunk_count, chunks, .. } => {
            Some(OutboundFrame::DocumentMetadataCompleted { document_id, title, chunk_count, chunks: chunk_summaries(chunks) })
        }
        DocumentNavigationCompleted { current, prev, next, .. } => {
            Some(OutboundFrame::DocumentNavigationCompleted { current, prev, next })
        }
        DocumentProcessingCompleted { status, .. } => Some(OutboundFrame::DocumentProcessingCompleted { status }),
        Error { in_reply_to, kind, message, user_cost, limit, field, .. } => {
            Some(OutboundFrame::Error { in_reply_to: wire_type_name(in_reply_to), kind, message, user_cost, limit, field })
        }
        _ => None,
    }
}

fn conversation_summaries(views: Vec<ConversationView>) -> Vec<ConversationSummary> {
    views
        .into_iter()
        .map(|c| ConversationSummary {
            id: c.id,
            kind: c.kind,
            origin_chunk_id: c.origin_chunk_id,
            is_demo: c.is_demo,
            highlight_text: c.highlight_text,
            highlight_range: c.highlight_range,
        })
        .collect()
}

fn message_summaries(views: Vec<MessageView>) -> Vec<MessageSummary> {
    views
        .into_iter()
        .map(|m| MessageSummary { id: m.id, role: m.role, content: m.content, chunk_context: m.chunk_context })
        .collect()
}

fn question_summaries(views: Vec<QuestionView>) -> Vec<QuestionSummary> {
    views
        .into_iter()
        .map(|q| QuestionSummary { id: q.id, content: q.content, chunk_id: q.chunk_id, answered: q.answered })
        .collect()
}

fn chunk_summaries(views: Vec<ChunkView>) -> Vec<ChunkSummary> {
    views.into_iter().map(|c| ChunkSummary { sequence: c.sequence, length: c.content.len(), content: c.content }).collect()
}

/// The client-facing request type string an `.error` frame's `in_reply_to`
/// echoes, e.g. `ConversationMessageSendRequested` -> `"conversation.message.send"`.
fn wire_type_name(kind: EventKind) -> String {
    use EventKind::*;
    let name = match kind {
        ConversationMainCreateRequested | ConversationMainCreateCompleted | ConversationMainCreateError => {
            "conversation.main.create"
        }
        ConversationChunkCreateRequested | ConversationChunkCreateCompleted | ConversationChunkCreateError => {
            "conversation.chunk.create"
        }
        ConversationMessageSendRequested | ConversationMessageSendCompleted | ConversationMessageSendError => {
            "conversation.message.send"
        }
        ChatToken | ChatCompleted => "chat",
        ConversationQuestionsGenerateRequested
        | ConversationQuestionsGenerateCompleted
        | ConversationQuestionsGenerateError => "conversation.questions.generate",
        ConversationQuestionsRegenerateRequested
        | ConversationQuestionsRegenerateCompleted
        | ConversationQuestionsRegenerateError => "conversation.questions.regenerate",
        ConversationQuestionsListRequested | ConversationQuestionsListCompleted | ConversationQuestionsListError => {
            "conversation.questions.list"
        }
        ConversationMergeRequested | ConversationMergeCompleted | ConversationMergeError => "conversation.chunk.merge",
        ConversationListRequested | ConversationListCompleted | ConversationListError => "conversation.list",
        ConversationMessagesRequested | ConversationMessagesCompleted | ConversationMessagesError => {
            "conversation.messages.get"
        }
        ConversationChunkGetRequested | ConversationChunkGetCompleted | ConversationChunkGetError => {
            "conversation.get.by.sequence"
        }
        DocumentChunkListRequested | DocumentChunkListCompleted | DocumentChunkListError => "document.chunk.list",
        DocumentMetadataRequested | DocumentMetadataCompleted | DocumentMetadataError => "document.metadata.get",
        DocumentNavigationRequested | DocumentNavigationCompleted | DocumentNavigationError => "document.navigation.get",
        DocumentProcessingRequested | DocumentProcessingCompleted | DocumentProcessingError => "document.processing.get",
    };
    name.to_string()
}

/// Build the `.error` frame for an inbound frame that failed to decode
/// (§7's `VALIDATION` kind). Best-effort: lifts `type`/`request_id` out of
/// the raw JSON if present so the client can still correlate the failure,
/// and extracts the missing field name from serde's error text when it
/// names one (serde_json renders that case as `` missing field `name` ``).
fn decode_error_response(raw: &str, err: &serde_json::Error) -> OutboundEnvelope {
    let value: serde_json::Value = serde_json::from_str(raw).unwrap_or(serde_json::Value::Null);
    let in_reply_to = value.get("type").and_then(|t| t.as_str()).unwrap_or("unknown").to_string();
    let request_id = value.get("request_id").and_then(|r| r.as_str()).map(|s| RequestId(s.to_string()));
    let field = missing_field_name(err);
    OutboundEnvelope {
        frame: OutboundFrame::Error {
            in_reply_to,
            kind: DocErrorKind::Validation,
            message: err.to_string(),
            user_cost: None,
            limit: None,
            field,
        },
        request_id,
    }
}

fn missing_field_name(err: &serde_json::Error) -> Option<String> {
    let msg = err.to_string();
    let marker = "missing field `";
    let start = msg.find(marker)? + marker.len();
    let rest = &msg[start..];
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
