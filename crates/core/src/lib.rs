// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! doc-core: shared domain types for the document-conversation Session &
//! Event Core — entity IDs, the typed event enum, error kinds, and process
//! configuration. No I/O lives here; this crate is pure data plus the
//! [`Clock`] testability seam.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod id;
pub mod macros;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, CostLimit};
pub use domain::{
    ContextMode, ConversationKind, ConversationMeta, DocumentStatus, ExampleDocumentSet,
    MessageMeta, OriginChunk, QuestionMeta, Role,
};
pub use error::{DocError, DocErrorKind, DocResult};
pub use event::{ChunkView, ConversationView, DocEvent, EventKind, MessageView, QuestionView};
pub use id::{ChunkSeq, ConnectionId, ConversationId, DocumentId, MessageId, QuestionId, RequestId, UserId};
