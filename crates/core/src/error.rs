// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced through `.error` wire events (§7).

use thiserror::Error;

/// The typed error kind, echoed in the outbound `.error` frame's `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    CostLimitExceeded,
    Timeout,
    BusOverflow,
    QueueFull,
    UpstreamLlm,
    UpstreamDb,
    Internal,
}

impl DocErrorKind {
    /// Whether this kind is ever written into a client-facing `.error` frame,
    /// as opposed to being logged only (`BUS_OVERFLOW`, `QUEUE_FULL`).
    pub fn is_user_visible(self) -> bool {
        !matches!(self, Self::BusOverflow | Self::QueueFull)
    }
}

/// Core error type for the Session & Event Core.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("validation failed: missing or invalid field '{field}'")]
    Validation { field: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("cost limit exceeded: ${user_cost:.2} >= ${limit:.2}")]
    CostLimitExceeded { user_cost: f64, limit: f64 },

    #[error("task timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("event bus overflow (high-water mark {high_water_mark} reached)")]
    BusOverflow { high_water_mark: usize },

    #[error("outbound queue full for connection")]
    QueueFull,

    #[error("upstream LLM call failed: {0}")]
    UpstreamLlm(String),

    #[error("upstream store operation failed: {0}")]
    UpstreamDb(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DocError {
    pub fn kind(&self) -> DocErrorKind {
        match self {
            Self::Validation { .. } => DocErrorKind::Validation,
            Self::NotFound { .. } => DocErrorKind::NotFound,
            Self::Unauthorized => DocErrorKind::Unauthorized,
            Self::CostLimitExceeded { .. } => DocErrorKind::CostLimitExceeded,
            Self::Timeout { .. } => DocErrorKind::Timeout,
            Self::BusOverflow { .. } => DocErrorKind::BusOverflow,
            Self::QueueFull => DocErrorKind::QueueFull,
            Self::UpstreamLlm(_) => DocErrorKind::UpstreamLlm,
            Self::UpstreamDb(_) => DocErrorKind::UpstreamDb,
            Self::Internal(_) => DocErrorKind::Internal,
        }
    }

    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation { field: field.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

pub type DocResult<T> = Result<T, DocError>;
