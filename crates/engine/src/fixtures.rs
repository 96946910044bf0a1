// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test fixtures: a ready-to-use [`EngineCtx`] wired from the `test-support`
//! fakes in `doc-adapters`, mirroring how the teacher's test modules build a
//! `Runtime` from fake adapters rather than hand-rolling one per test.

use std::sync::Arc;

use doc_adapters::FakeLlmClient;
use doc_core::{Config, FakeClock};
use doc_storage::DocStore;

use crate::bus::EventBus;
use crate::ctx::EngineCtx;

/// A fully wired [`EngineCtx`] plus handles to its fakes, for assertions on
/// call counts or to advance the clock mid-test.
pub struct TestHarness {
    pub ctx: EngineCtx,
    pub llm: Arc<FakeLlmClient>,
    pub clock: Arc<FakeClock>,
}

pub fn harness() -> TestHarness {
    harness_with_config(Config::default())
}

pub fn harness_with_config(config: Config) -> TestHarness {
    let store = Arc::new(DocStore::new());
    let llm = Arc::new(FakeLlmClient::new("hello world", 0.01));
    let bus = Arc::new(EventBus::new(1_000));
    let clock = Arc::new(FakeClock::new());
    let ctx = EngineCtx::new(store, llm.clone(), bus, Arc::new(config), clock.clone());
    TestHarness { ctx, llm, clock }
}
