// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing used by every scheduled handler: the common "catch the
//! error, log it if internal, emit the typed `.error` terminal" tail that
//! spec §7 requires of every request handler.

use doc_core::{ConnectionId, DocError, DocErrorKind, DocEvent, DocumentId, EventKind, RequestId};
use tracing::warn;

use crate::bus::EventBus;

/// Emit the `.error` terminal for `err`, logging it first if it's an
/// internal fault (never user-caused, so worth a server-side trace even
/// though the client only sees a generic message).
pub fn emit_error(
    bus: &EventBus,
    document_id: DocumentId,
    connection_id: ConnectionId,
    request_id: Option<RequestId>,
    in_reply_to: EventKind,
    err: DocError,
) {
    if err.kind() == DocErrorKind::Internal {
        warn!(%document_id, ?err, "internal error handling request");
    }
    let _ = bus.emit(DocEvent::error_from(document_id, connection_id, request_id, in_reply_to, &err));
}
