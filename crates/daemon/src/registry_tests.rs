use super::*;
use doc_core::DocumentId;
use std::time::Duration;

fn registry() -> ConnectionRegistry {
    ConnectionRegistry::new(Duration::from_millis(100))
}

fn list_completed(document_id: DocumentId, connection_id: ConnectionId) -> DocEvent {
    DocEvent::ListCompleted { document_id, connection_id, request_id: None, conversations: vec![] }
}

#[tokio::test]
async fn dispatch_delivers_only_to_subscribed_kind() {
    let reg = registry();
    let document_id = DocumentId::new();
    let conn_id = ConnectionId::new();
    let mut rx = reg.connect(conn_id.clone(), document_id, Scope::Conversation, 8);

    reg.dispatch(list_completed(document_id, conn_id.clone())).await;
    assert!(rx.try_recv().is_err(), "should not deliver before subscribing to the kind");

    reg.subscribe(&conn_id, EventKind::ConversationListCompleted);
    reg.dispatch(list_completed(document_id, conn_id.clone())).await;
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn dispatch_ignores_events_for_other_connections() {
    let reg = registry();
    let document_id = DocumentId::new();
    let conn_a = ConnectionId::new();
    let conn_b = ConnectionId::new();
    let mut rx_a = reg.connect(conn_a.clone(), document_id, Scope::Conversation, 8);
    reg.subscribe(&conn_a, EventKind::ConversationListCompleted);
    let _rx_b = reg.connect(conn_b.clone(), document_id, Scope::Conversation, 8);
    reg.subscribe(&conn_b, EventKind::ConversationListCompleted);

    reg.dispatch(list_completed(document_id, conn_b.clone())).await;
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test]
async fn disconnect_is_idempotent_and_stops_delivery() {
    let reg = registry();
    let document_id = DocumentId::new();
    let conn_id = ConnectionId::new();
    let mut rx = reg.connect(conn_id.clone(), document_id, Scope::Conversation, 8);
    reg.subscribe(&conn_id, EventKind::ConversationListCompleted);

    reg.disconnect(&conn_id, document_id, Scope::Conversation);
    reg.disconnect(&conn_id, document_id, Scope::Conversation);

    reg.dispatch(list_completed(document_id, conn_id)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(reg.live_connection_count(document_id), 0);
}

#[tokio::test]
async fn saturated_queue_drops_the_event_without_panicking() {
    let reg = ConnectionRegistry::new(Duration::from_millis(20));
    let document_id = DocumentId::new();
    let conn_id = ConnectionId::new();
    let _rx = reg.connect(conn_id.clone(), document_id, Scope::Conversation, 1);
    reg.subscribe(&conn_id, EventKind::ConversationListCompleted);

    reg.dispatch(list_completed(document_id, conn_id.clone())).await;
    reg.dispatch(list_completed(document_id, conn_id)).await;
}
