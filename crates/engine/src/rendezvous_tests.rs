use super::*;
use std::time::Duration;

fn key(stage: &str) -> RendezvousKey {
    RendezvousKey::new(WorkflowId::new(), stage, None)
}

#[tokio::test]
async fn signal_resolves_a_waiting_consumer() {
    let rendezvous = CompletionRendezvous::new();
    let key = key("implement");
    let waiter = rendezvous.wait_for_completion(key.clone(), Duration::from_secs(5));

    rendezvous.signal_completion(
        key,
        CompletionSignal { result: "ok".into(), payload: None, signaled_at_ms: 1 },
    );

    let signal = waiter.await.expect("signal delivered");
    assert_eq!(signal.result, "ok");
}

#[tokio::test]
async fn wait_times_out_without_a_signal() {
    let rendezvous = CompletionRendezvous::new();
    let key = key("implement");
    let err = rendezvous.wait_for_completion(key, Duration::from_millis(10)).await.unwrap_err();
    assert_eq!(err, RendezvousError::TimedOut);
}

#[tokio::test]
async fn signal_with_no_waiter_is_dropped_not_queued() {
    let rendezvous = CompletionRendezvous::new();
    // Should not panic, and a later wait on the same key must not see a
    // stale signal delivered before it existed.
    rendezvous.signal_completion(
        key("implement"),
        CompletionSignal { result: "ok".into(), payload: None, signaled_at_ms: 1 },
    );
    assert_eq!(rendezvous.live_signal_count(), 0);
}

#[tokio::test]
async fn cancel_pending_signal_tears_down_the_wait() {
    let rendezvous = CompletionRendezvous::new();
    let wf = WorkflowId::new();
    let key = RendezvousKey::new(wf, "implement", None);
    let waiter = rendezvous.wait_for_completion(key.clone(), Duration::from_secs(5));

    rendezvous.cancel_pending_signal(wf, None);
    let err = waiter.await.unwrap_err();
    assert_eq!(err, RendezvousError::Cancelled);
}

#[tokio::test]
async fn cancel_pending_signal_scoped_to_stage_leaves_others_live() {
    let rendezvous = CompletionRendezvous::new();
    let wf = WorkflowId::new();
    let implement_key = RendezvousKey::new(wf, "implement", None);
    let review_key = RendezvousKey::new(wf, "review", None);
    let implement_wait = rendezvous.wait_for_completion(implement_key, Duration::from_secs(5));
    let _review_wait = rendezvous.wait_for_completion(review_key.clone(), Duration::from_secs(5));

    rendezvous.cancel_pending_signal(wf, Some("implement"));
    assert!(implement_wait.await.is_err());
    assert_eq!(rendezvous.live_signal_count(), 1);
}
