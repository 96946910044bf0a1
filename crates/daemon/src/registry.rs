// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection Registry (spec §4.2): holds every live WebSocket session, its
//! scope, its subscribed event-type filter, and a bounded per-connection
//! outbound queue. Registered once on the [`doc_engine::bus::EventBus`] as a
//! single wildcard listener, the same shape the teacher's dispatcher loop
//! uses for fanning bus events out to per-connection consumers.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use doc_core::{ConnectionId, DocEvent, DocumentId, EventKind};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// The two session scopes a connection may be registered under (§4.2, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Document,
    Conversation,
}

struct SessionEntry {
    document_id: DocumentId,
    scope: Scope,
    filter: HashSet<EventKind>,
    tx: mpsc::Sender<DocEvent>,
}

/// Bounded per-connection outbound routing, addressed by `connection_id`
/// (§4.2's "events are delivered only to the originating connection").
pub struct ConnectionRegistry {
    sessions: Mutex<HashMap<ConnectionId, SessionEntry>>,
    by_document: Mutex<HashMap<DocumentId, HashSet<ConnectionId>>>,
    put_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new(put_timeout: Duration) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), by_document: Mutex::new(HashMap::new()), put_timeout }
    }

    /// Register `conn_id`, creating its bounded outbound queue of capacity
    /// `capacity` (default 256, §6). Returns the receiving half for the
    /// session's outbound loop to drain.
    pub fn connect(
        &self,
        conn_id: ConnectionId,
        document_id: DocumentId,
        scope: Scope,
        capacity: usize,
    ) -> mpsc::Receiver<DocEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.sessions.lock().insert(conn_id.clone(), SessionEntry { document_id, scope, filter: HashSet::new(), tx });
        self.by_document.lock().entry(document_id).or_default().insert(conn_id);
        rx
    }

    /// Add `kind` to `conn_id`'s interest filter (§4.2: "adds `type` to the
    /// connection's filter").
    pub fn subscribe(&self, conn_id: &ConnectionId, kind: EventKind) {
        if let Some(entry) = self.sessions.lock().get_mut(conn_id) {
            entry.filter.insert(kind);
        }
    }

    pub fn subscribe_many(&self, conn_id: &ConnectionId, kinds: impl IntoIterator<Item = EventKind>) {
        if let Some(entry) = self.sessions.lock().get_mut(conn_id) {
            entry.filter.extend(kinds);
        }
    }

    /// The wildcard listener registered on the event bus. Routes `event` to
    /// its originating connection's queue if that connection still exists
    /// and has subscribed to `event`'s kind; on a saturated queue, logs
    /// `QUEUE_FULL` and drops the event for that connection only (§4.2, §7).
    pub async fn dispatch(&self, event: DocEvent) {
        let conn_id = event.connection_id();
        let kind = event.kind();
        let tx = {
            let sessions = self.sessions.lock();
            match sessions.get(&conn_id) {
                Some(entry) if entry.filter.contains(&kind) => Some(entry.tx.clone()),
                _ => None,
            }
        };
        let Some(tx) = tx else { return };

        match tokio::time::timeout(self.put_timeout, tx.send(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {} // connection's outbound loop has already exited
            Err(_) => {
                warn!(%conn_id, ?kind, "QUEUE_FULL: outbound queue saturated, dropping event for connection");
            }
        }
    }

    /// Remove `conn_id`'s indexes. Idempotent (§4.2).
    pub fn disconnect(&self, conn_id: &ConnectionId, document_id: DocumentId, _scope: Scope) {
        self.sessions.lock().remove(conn_id);
        if let Some(set) = self.by_document.lock().get_mut(&document_id) {
            set.remove(conn_id);
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn live_connection_count(&self, document_id: DocumentId) -> usize {
        self.by_document.lock().get(&document_id).map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
