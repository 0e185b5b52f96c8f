use foxcomm_client::{ClientEvent, LinkState, NegotiationError};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{
    SIGNAL_TIMEOUT_MS, ScriptedConnector, TestPeer, spawn_forwarder, wait_for_event,
    wait_for_state,
};

#[tokio::test]
async fn test_remote_description_failure() {
    init_tracing();

    let a = TestPeer::spawn("peer-aaaaaa", Arc::new(ScriptedConnector::new("a")));
    let mut b = TestPeer::spawn(
        "peer-bbbbbb",
        Arc::new(ScriptedConnector::rejecting_remote_descriptions("b")),
    );

    spawn_forwarder(a.outbox, b.handle.clone());
    spawn_forwarder(b.outbox, a.handle.clone());

    a.handle.connect_to(b.id.clone());

    let failed = wait_for_event(&mut b.events, SIGNAL_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::NegotiationFailed { .. })
    })
    .await
    .expect("failure was not reported");
    match failed {
        ClientEvent::NegotiationFailed { peer, reason } => {
            assert_eq!(peer, a.id);
            assert!(matches!(reason, NegotiationError::RemoteDescription(_)));
        }
        other => panic!("unexpected event {:?}", other),
    }

    let closed = wait_for_event(&mut b.events, SIGNAL_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::LinkClosed { .. })
    })
    .await
    .unwrap();
    assert_eq!(closed, ClientEvent::LinkClosed { peer: a.id.clone() });

    // The offering side is untouched and still waiting for an answer.
    wait_for_state(&a.handle, &b.id, LinkState::Offering, SIGNAL_TIMEOUT_MS)
        .await
        .unwrap();
    assert!(a.handle.is_running());
}
