use super::*;
use crate::fixtures::harness;
use doc_core::{ChunkSeq, ConnectionId, DocumentId};
use parking_lot::Mutex as StdMutex;
use std::sync::Arc;
use std::time::Duration;

fn main_create_requested() -> DocEvent {
    DocEvent::MainCreateRequested {
        document_id: DocumentId::new(),
        connection_id: ConnectionId::new(),
        request_id: None,
        chunk_id: Some(ChunkSeq(0)),
        user_id: None,
    }
}

#[tokio::test]
async fn dispatches_through_the_scheduler_not_inline() {
    let h = harness();
    let bus = h.ctx.bus.clone();
    bus.initialize();
    let scheduler = Arc::new(Scheduler::new(Duration::from_secs(25)));
    scheduler.start(h.ctx.clone(), bus.clone());

    let ran = Arc::new(StdMutex::new(false));
    let ran2 = Arc::clone(&ran);
    scheduler.register(
        &bus,
        EventKind::ConversationMainCreateRequested,
        Arc::new(move |_ctx, _event| {
            let ran2 = Arc::clone(&ran2);
            Box::pin(async move {
                *ran2.lock() = true;
            })
        }),
    );

    bus.emit(main_create_requested()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(*ran.lock());
    assert_eq!(scheduler.active_count(), 0);

    scheduler.shutdown().await;
    bus.shutdown().await;
}

#[tokio::test]
async fn a_handler_that_outlives_its_deadline_emits_a_timeout_error() {
    let h = harness();
    let bus = h.ctx.bus.clone();
    bus.initialize();
    let scheduler = Arc::new(Scheduler::new(Duration::from_millis(20)));
    scheduler.start(h.ctx.clone(), bus.clone());

    scheduler.register(
        &bus,
        EventKind::ConversationMainCreateRequested,
        Arc::new(|_ctx, _event| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
            })
        }),
    );

    let errors = Arc::new(StdMutex::new(Vec::new()));
    let errors2 = Arc::clone(&errors);
    bus.on_all(move |event: DocEvent| {
        let errors2 = Arc::clone(&errors2);
        async move {
            if let DocEvent::Error { kind, .. } = event {
                errors2.lock().push(kind);
            }
        }
    });

    bus.emit(main_create_requested()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*errors.lock(), vec![DocErrorKind::Timeout]);

    scheduler.shutdown().await;
    bus.shutdown().await;
}

#[tokio::test]
async fn shutdown_aborts_in_flight_tasks() {
    let h = harness();
    let bus = h.ctx.bus.clone();
    bus.initialize();
    let scheduler = Arc::new(Scheduler::new(Duration::from_secs(25)));
    scheduler.start(h.ctx.clone(), bus.clone());

    scheduler.register(
        &bus,
        EventKind::ConversationMainCreateRequested,
        Arc::new(|_ctx, _event| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
        }),
    );

    bus.emit(main_create_requested()).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(scheduler.active_count(), 1);

    scheduler.shutdown().await;
    assert_eq!(scheduler.active_count(), 0);
    bus.shutdown().await;
}
