// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process event bus (spec §4.1).
//!
//! Grounded on the teacher's event-dispatch pattern (a typed event enum fed
//! through an mpsc channel to a single dispatcher loop): `DocEvent` already
//! carries its own `EventKind` routing key (`doc-core::event`), so the bus
//! itself is just a listener table plus one worker task draining the
//! channel in emission order. Listeners registered under [`EventKind`]s see
//! only matching events; listeners registered via [`EventBus::on_all`] (the
//! "wildcard" subscription in spec §4.1, used by the Connection Registry)
//! see every event after type-specific listeners have run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use doc_core::{DocError, DocResult, EventKind};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub type SubscriptionId = u64;

/// A listener invoked by the dispatcher loop for each matching event.
///
/// A fault inside `handle` is logged and does not interrupt sibling
/// listeners or the dispatcher loop (spec §4.1: "a handler fault is logged
/// and does not interrupt sibling handlers or the worker").
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: doc_core::DocEvent);
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(doc_core::DocEvent) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: doc_core::DocEvent) {
        (self)(event).await
    }
}

#[derive(Default)]
struct Listeners {
    by_kind: HashMap<EventKind, Vec<(SubscriptionId, Arc<dyn EventHandler>)>>,
    wildcard: Vec<(SubscriptionId, Arc<dyn EventHandler>)>,
}

/// Single-process, ordered, asynchronous event dispatcher.
///
/// Emission is non-blocking: [`EventBus::emit`] pushes onto a bounded
/// channel and returns immediately, failing fast with
/// [`DocError::BusOverflow`] once the configured high-water mark is
/// reached rather than applying backpressure to the caller.
pub struct EventBus {
    tx: mpsc::Sender<doc_core::DocEvent>,
    rx: Mutex<Option<mpsc::Receiver<doc_core::DocEvent>>>,
    listeners: Arc<Mutex<Listeners>>,
    next_sub_id: AtomicU64,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
    high_water_mark: usize,
}

impl EventBus {
    pub fn new(high_water_mark: usize) -> Self {
        let (tx, rx) = mpsc::channel(high_water_mark.max(1));
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            next_sub_id: AtomicU64::new(0),
            shutdown_tx: Mutex::new(None),
            worker: Mutex::new(None),
            high_water_mark,
        }
    }

    /// Register a listener for a specific event kind. Registration order is
    /// preserved; returns a handle for [`EventBus::off`].
    pub fn on(&self, kind: EventKind, handler: impl EventHandler) -> SubscriptionId {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().by_kind.entry(kind).or_default().push((id, Arc::new(handler)));
        id
    }

    /// Register a wildcard listener, invoked for every event after that
    /// event's type-specific listeners have run (spec §4.1, §9).
    pub fn on_all(&self, handler: impl EventHandler) -> SubscriptionId {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().wildcard.push((id, Arc::new(handler)));
        id
    }

    /// Unregister a listener previously returned by [`EventBus::on`] or
    /// [`EventBus::on_all`].
    pub fn off(&self, id: SubscriptionId) {
        let mut listeners = self.listeners.lock();
        for handlers in listeners.by_kind.values_mut() {
            handlers.retain(|(hid, _)| *hid != id);
        }
        listeners.wildcard.retain(|(hid, _)| *hid != id);
    }

    /// Enqueue an event for dispatch. Returns immediately.
    pub fn emit(&self, event: doc_core::DocEvent) -> DocResult<()> {
        self.tx.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                warn!(high_water_mark = self.high_water_mark, "event bus overflow");
                DocError::BusOverflow { high_water_mark: self.high_water_mark }
            }
            mpsc::error::TrySendError::Closed(_) => {
                DocError::Internal("event bus dispatcher not running".to_string())
            }
        })
    }

    /// Start the single dispatcher worker. Idempotent: calling this twice
    /// while already running is a no-op.
    pub fn initialize(self: &Arc<Self>) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return;
        }
        let Some(mut rx) = self.rx.lock().take() else { return };
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(shutdown_tx);
        let listeners = Arc::clone(&self.listeners);

        *worker = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        debug!("event bus dispatcher shutting down");
                        break;
                    }
                    event = rx.recv() => {
                        match event {
                            Some(event) => dispatch(&listeners, event).await,
                            None => break,
                        }
                    }
                }
            }
        }));
    }

    /// Stop the dispatcher worker and await its termination.
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn dispatch(listeners: &Arc<Mutex<Listeners>>, event: doc_core::DocEvent) {
    let kind = event.kind();
    let (kind_handlers, wildcard_handlers) = {
        let listeners = listeners.lock();
        let kind_handlers = listeners.by_kind.get(&kind).cloned().unwrap_or_default();
        let wildcard_handlers = listeners.wildcard.clone();
        (kind_handlers, wildcard_handlers)
    };
    for (_, handler) in kind_handlers.iter().chain(wildcard_handlers.iter()) {
        handler.handle(event.clone()).await;
    }
    if kind_handlers.is_empty() && wildcard_handlers.is_empty() {
        debug!(?kind, "event dispatched with no listeners");
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
