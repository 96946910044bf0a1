// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service Scheduler (spec §4.4): converts event-bus handlers into bounded,
//! isolated task executions so that handlers doing LLM/DB-equivalent work
//! never block the bus dispatcher loop.
//!
//! [`Scheduler::register`] wraps a handler in an O(1) adapter registered on
//! the [`EventBus`]: the adapter only pushes `(handler, event)` onto an
//! internal FIFO and returns. A single background worker pops that FIFO and
//! `tokio::spawn`s each popped item as a tracked task under a deadline,
//! mirroring the teacher's `oj-engine::runtime` split between a dispatch
//! loop and a set of tracked spawned task handles.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use doc_core::{DocErrorKind, DocEvent, EventKind};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::bus::EventBus;
use crate::ctx::EngineCtx;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A scheduled request handler: given the engine context and the triggering
/// event, perform the work and emit its own completion/error event(s).
pub type Handler = Arc<dyn Fn(EngineCtx, DocEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Bounded FIFO task queue with per-task timeout (spec §4.4, §5).
pub struct Scheduler {
    queue_tx: mpsc::UnboundedSender<(Handler, DocEvent)>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<(Handler, DocEvent)>>>,
    active: Arc<Mutex<HashMap<u64, tokio::task::JoinHandle<()>>>>,
    next_task_id: AtomicU64,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    timeout: Duration,
}

impl Scheduler {
    pub fn new(timeout: Duration) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            active: Arc::new(Mutex::new(HashMap::new())),
            next_task_id: AtomicU64::new(0),
            worker: Mutex::new(None),
            shutdown_tx: Mutex::new(None),
            timeout,
        }
    }

    /// Register `handler` on `bus` for `kind`. The registered adapter is O(1):
    /// it only enqueues onto this scheduler's FIFO.
    pub fn register(&self, bus: &EventBus, kind: EventKind, handler: Handler) {
        let queue_tx = self.queue_tx.clone();
        bus.on(kind, move |event: DocEvent| {
            let queue_tx = queue_tx.clone();
            let handler = Arc::clone(&handler);
            async move {
                let _ = queue_tx.send((handler, event));
            }
        });
    }

    /// Start the background worker that pops the FIFO and spawns tracked
    /// tasks. `ctx` is cloned into every spawned task (spec §4.4's "fresh DB
    /// session per task" — here, a fresh clone of the in-memory store
    /// handle).
    pub fn start(self: &Arc<Self>, ctx: EngineCtx, bus: Arc<EventBus>) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return;
        }
        let Some(mut queue_rx) = self.queue_rx.lock().take() else { return };
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(shutdown_tx);

        let active = Arc::clone(&self.active);
        let next_task_id = AtomicU64::new(self.next_task_id.load(Ordering::Relaxed));
        let timeout = self.timeout;

        *worker = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    item = queue_rx.recv() => {
                        let Some((handler, event)) = item else { break };
                        spawn_task(&active, &next_task_id, timeout, ctx.clone(), Arc::clone(&bus), handler, event);
                    }
                }
            }
        }));
    }

    /// Stop accepting new tasks and cancel every active one, awaiting their
    /// termination (spec §4.4, §5: "on shutdown, the scheduler cancels all
    /// active tasks and awaits their termination").
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
        let active: Vec<_> = self.active.lock().drain().collect();
        for (_, handle) in active {
            handle.abort();
        }
    }

    /// Number of tasks currently tracked as in flight. Test-only observability
    /// hook: production code has no need to poll this.
    #[cfg(any(test, feature = "test-support"))]
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

fn spawn_task(
    active: &Arc<Mutex<HashMap<u64, tokio::task::JoinHandle<()>>>>,
    next_task_id: &AtomicU64,
    timeout: Duration,
    ctx: EngineCtx,
    bus: Arc<EventBus>,
    handler: Handler,
    event: DocEvent,
) {
    let task_id = next_task_id.fetch_add(1, Ordering::Relaxed);
    let active_for_task = Arc::clone(active);
    let document_id = event.document_id();
    let connection_id = event.connection_id();
    let request_id = event.request_id();
    let in_reply_to = event.kind();

    // The task must not remove itself from `active` until the entry is
    // actually there. A task that finished before `active.lock().insert(...)`
    // below would otherwise race ahead and leave a never-removed stale
    // entry once the parent inserted it, so the task waits on `registered_rx`
    // — fired only after the insert — before doing any real work.
    let (registered_tx, registered_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let _ = registered_rx.await;
        let outcome = tokio::time::timeout(timeout, (handler)(ctx, event)).await;
        if outcome.is_err() {
            warn!(?in_reply_to, timeout_secs = timeout.as_secs(), "scheduled task timed out");
            let _ = bus.emit(DocEvent::Error {
                document_id,
                connection_id,
                request_id,
                in_reply_to,
                kind: DocErrorKind::Timeout,
                message: format!("task timed out after {}s", timeout.as_secs()),
                user_cost: None,
                limit: None,
                field: None,
            });
        }
        active_for_task.lock().remove(&task_id);
    });
    active.lock().insert(task_id, handle);
    let _ = registered_tx.send(());
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
