use super::*;
use oj_core::SessionId;

#[tokio::test]
async fn subscribers_receive_events_emitted_after_they_subscribe() {
    let bus = EventBroadcaster::new();
    let mut rx = bus.subscribe();

    bus.emit(Event::SessionCreated { session_id: SessionId::new("PS_000001"), created_at_ms: 1 });

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::SessionCreated { .. }));
}

#[tokio::test]
async fn emit_with_no_subscribers_does_not_panic() {
    let bus = EventBroadcaster::new();
    assert_eq!(bus.receiver_count(), 0);
    bus.emit(Event::Shutdown);
}

#[tokio::test]
async fn receiver_count_reflects_live_subscribers() {
    let bus = EventBroadcaster::new();
    let _a = bus.subscribe();
    let _b = bus.subscribe();
    assert_eq!(bus.receiver_count(), 2);
    drop(_a);
    assert_eq!(bus.receiver_count(), 1);
}
