// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UUID-backed entity ID newtypes.

use uuid::Uuid;

/// Define a newtype ID wrapper around [`Uuid`].
///
/// Generates `new()` for random v4 generation, `from_uuid()`/`parse()` for
/// existing values, `Display`, `From<Uuid>`, and `Deref<Target = Uuid>`.
///
/// ```ignore
/// define_uuid_id! {
///     /// Doc comment for the ID type.
///     pub struct DocumentId;
/// }
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            /// Parse an ID from its string form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl std::ops::Deref for $name {
            type Target = uuid::Uuid;

            fn deref(&self) -> &uuid::Uuid {
                &self.0
            }
        }
    };
}

define_uuid_id! {
    /// A user of the product.
    pub struct UserId;
}

define_uuid_id! {
    /// A document uploaded (or a curated example document).
    pub struct DocumentId;
}

define_uuid_id! {
    /// A conversation (main or highlight) attached to a document.
    pub struct ConversationId;
}

define_uuid_id! {
    /// A single message within a conversation.
    pub struct MessageId;
}

define_uuid_id! {
    /// A suggested question attached to a conversation+chunk.
    pub struct QuestionId;
}

/// A live WebSocket connection identifier.
///
/// Not a UUID newtype: connection ids are generated per-socket at accept
/// time and compared constantly in hot paths (registry dispatch), so they
/// are a plain owned string rather than going through `Uuid::parse_str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Client-supplied correlation token, echoed verbatim on completion/error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 0-based chunk sequence number within a document.
///
/// Stored and compared as a string in a few places (per the data model's
/// `origin_chunk_id`/`chunk_context` fields, which are "sequence number, as
/// string") — [`ChunkSeq::to_string`]/`FromStr` bridge the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChunkSeq(pub u32);

impl std::fmt::Display for ChunkSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChunkSeq {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
