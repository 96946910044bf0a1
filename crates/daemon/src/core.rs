// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonCore`: the process composition root, wiring the engine context,
//! the bus, the scheduler and the Connection Registry together exactly
//! once at startup — the same shape as the teacher's `ListenCtx`, which
//! bundles every long-lived collaborator a connection handler needs rather
//! than reaching for globals.
//!
//! Deliberately absent: `BlobStore`/`Ingest`. Document ingestion is an HTTP
//! upload surface, not part of this WebSocket core.

use std::sync::Arc;

use doc_adapters::{AuthResolver, LlmClient};
use doc_core::{Config, SystemClock};
use doc_engine::bus::EventBus;
use doc_engine::ctx::EngineCtx;
use doc_engine::scheduler::Scheduler;
use doc_storage::DocStore;

use crate::registry::ConnectionRegistry;

pub struct DaemonCore {
    pub ctx: EngineCtx,
    pub bus: Arc<EventBus>,
    pub scheduler: Arc<Scheduler>,
    pub registry: Arc<ConnectionRegistry>,
    pub auth: Arc<dyn AuthResolver>,
    pub config: Arc<Config>,
}

impl DaemonCore {
    pub fn new(config: Config, llm: Arc<dyn LlmClient>, auth: Arc<dyn AuthResolver>) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(DocStore::new());
        let bus = Arc::new(EventBus::new(config.bus_high_water_mark));
        let clock = Arc::new(SystemClock);
        let ctx = EngineCtx::new(store, llm, Arc::clone(&bus), Arc::clone(&config), clock);
        let scheduler = Arc::new(Scheduler::new(config.task_timeout));
        let registry = Arc::new(ConnectionRegistry::new(config.per_conn_put_timeout));

        doc_engine::conversation::register(&scheduler, &bus);
        doc_engine::document::register(&scheduler, &bus);

        let registry_for_dispatch = Arc::clone(&registry);
        bus.on_all(move |event: doc_core::DocEvent| {
            let registry = Arc::clone(&registry_for_dispatch);
            async move { registry.dispatch(event).await }
        });

        Self { ctx, bus, scheduler, registry, auth, config }
    }

    /// Start the bus dispatcher and the scheduler worker. Call once before
    /// accepting connections.
    pub fn start(&self) {
        self.bus.initialize();
        self.scheduler.start(self.ctx.clone(), Arc::clone(&self.bus));
    }

    /// Stop the scheduler (cancelling in-flight tasks) and the bus
    /// dispatcher, in that order, awaiting both.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        self.bus.shutdown().await;
    }

    pub fn per_conn_queue_capacity(&self) -> usize {
        self.config.per_conn_queue_capacity
    }
}
