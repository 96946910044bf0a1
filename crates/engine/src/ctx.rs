// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's composition-root handle, threaded by reference into every
//! request handler instead of reaching for module-level singletons (per
//! the Process-wide singletons design note: "replace with a composition-root
//! `Core` value passed by reference into handlers").

use std::sync::Arc;

use doc_adapters::LlmClient;
use doc_core::Config;
use doc_prompts::PromptComposer;
use doc_storage::DocStore;

use crate::bus::EventBus;

/// Object-safe subset of [`doc_core::Clock`], sufficient for stamping
/// `created_at_ms` fields. Not `doc_core::Clock` itself: that trait's
/// `Clone` supertrait makes it non-object-safe, and the engine only ever
/// needs read access to the current time, never to clone the clock.
pub trait EpochClock: Send + Sync + 'static {
    fn epoch_ms(&self) -> u64;
}

impl<T: doc_core::Clock> EpochClock for T {
    fn epoch_ms(&self) -> u64 {
        doc_core::Clock::epoch_ms(self)
    }
}

/// Everything a conversation/document/cost handler needs to do its work:
/// the store, the LLM collaborator, the prompt composer, the bus it reports
/// completions/errors on, process configuration, and a clock.
///
/// Cheap to clone (every field is an `Arc` or `Copy`); each scheduled task
/// holds its own clone, matching the "fresh DB session per task" framing in
/// spec §4.4 even though `DocStore` itself has no connection to open.
#[derive(Clone)]
pub struct EngineCtx {
    pub store: Arc<DocStore>,
    pub llm: Arc<dyn LlmClient>,
    pub prompts: PromptComposer,
    pub bus: Arc<EventBus>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn EpochClock>,
}

impl EngineCtx {
    pub fn new(
        store: Arc<DocStore>,
        llm: Arc<dyn LlmClient>,
        bus: Arc<EventBus>,
        config: Arc<Config>,
        clock: Arc<dyn EpochClock>,
    ) -> Self {
        Self { store, llm, prompts: PromptComposer::new(), bus, config, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}
