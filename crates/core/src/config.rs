// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration (§6), read from environment variables with defaults.
//!
//! Rust-native equivalent of the teacher's `oj-daemon::env` module: no
//! settings framework, just `std::env::var` lookups with `FromStr` parsing
//! and documented fallbacks.

use crate::id::DocumentId;
use std::collections::HashSet;
use std::time::Duration;

/// Per-user cost ceiling, in dollars (§4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostLimit(pub f64);

impl Default for CostLimit {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Process-wide configuration, assembled once at startup and shared by
/// reference (an `Arc<Config>`) rather than read from a global singleton.
#[derive(Debug, Clone)]
pub struct Config {
    pub cost_limit: CostLimit,
    pub example_document_ids: HashSet<DocumentId>,
    pub max_chunks_per_doc: usize,
    pub default_chunk_size: usize,
    pub task_timeout: Duration,
    pub per_conn_queue_capacity: usize,
    pub per_conn_put_timeout: Duration,
    pub chat_model_default: String,
    pub chat_model_full_context: String,
    pub bus_high_water_mark: usize,
    /// Address the daemon's WebSocket listener binds (§6's endpoint table).
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cost_limit: CostLimit::default(),
            example_document_ids: HashSet::new(),
            max_chunks_per_doc: 100,
            default_chunk_size: 2_500,
            task_timeout: Duration::from_secs(25),
            per_conn_queue_capacity: 256,
            per_conn_put_timeout: Duration::from_millis(1_000),
            chat_model_default: "claude-sonnet".to_string(),
            chat_model_full_context: "gemini-2.0-flash-exp".to_string(),
            bus_high_water_mark: 10_000,
            listen_addr: "127.0.0.1:8088".to_string(),
        }
    }
}

impl Config {
    /// Build configuration from environment variables, falling back to
    /// [`Config::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cost_limit: CostLimit(env_f64("COST_LIMIT", defaults.cost_limit.0)),
            example_document_ids: env_document_ids("EXAMPLE_DOCUMENT_IDS"),
            max_chunks_per_doc: env_usize("MAX_CHUNKS_PER_DOC", defaults.max_chunks_per_doc),
            default_chunk_size: env_usize("DEFAULT_CHUNK_SIZE", defaults.default_chunk_size),
            task_timeout: Duration::from_secs(env_u64("TASK_TIMEOUT_SECONDS", 25)),
            per_conn_queue_capacity: env_usize(
                "PER_CONN_QUEUE_CAPACITY",
                defaults.per_conn_queue_capacity,
            ),
            per_conn_put_timeout: Duration::from_millis(env_u64("PER_CONN_PUT_TIMEOUT_MS", 1_000)),
            chat_model_default: std::env::var("CHAT_MODEL_DEFAULT")
                .unwrap_or(defaults.chat_model_default),
            chat_model_full_context: std::env::var("CHAT_MODEL_FULL_CONTEXT")
                .unwrap_or(defaults.chat_model_full_context),
            bus_high_water_mark: env_usize("BUS_HIGH_WATER_MARK", defaults.bus_high_water_mark),
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_document_ids(key: &str) -> HashSet<DocumentId> {
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.split(',')
                .filter(|s| !s.trim().is_empty())
                .filter_map(|s| DocumentId::parse(s.trim()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.cost_limit.0, 0.5);
        assert_eq!(cfg.max_chunks_per_doc, 100);
        assert_eq!(cfg.task_timeout, Duration::from_secs(25));
        assert_eq!(cfg.per_conn_queue_capacity, 256);
        assert_eq!(cfg.per_conn_put_timeout, Duration::from_millis(1_000));
    }

    #[test]
    fn env_document_ids_skips_unparsable_entries() {
        let valid = DocumentId::new();
        let raw = format!("{valid}, not-a-uuid");
        // SAFETY: test runs single-threaded within this process's test harness.
        unsafe {
            std::env::set_var("TEST_EXAMPLE_DOCUMENT_IDS", &raw);
        }
        let ids = env_document_ids("TEST_EXAMPLE_DOCUMENT_IDS");
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&valid));
        unsafe {
            std::env::remove_var("TEST_EXAMPLE_DOCUMENT_IDS");
        }
    }
}
