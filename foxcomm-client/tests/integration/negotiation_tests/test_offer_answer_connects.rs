use foxcomm_client::LinkState;
use foxcomm_core::{Envelope, PeerId, SdpKind, SignalPayload};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{
    CONNECT_TIMEOUT_MS, ScriptedConnector, TestPeer, spawn_forwarder, wait_for_state,
};

fn first_signal(sent: &[Envelope]) -> (SignalPayload, Option<PeerId>) {
    match &sent[0] {
        Envelope::Signal { payload, to, .. } => {
            let payload = serde_json::from_value(payload.clone()).unwrap();
            (payload, to.clone())
        }
        other => panic!("expected signal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_offer_answer_connects() {
    init_tracing();

    let a_connector = ScriptedConnector::new("a");
    let b_connector = ScriptedConnector::new("b");
    let a = TestPeer::spawn("peer-aaaaaa", Arc::new(a_connector.clone()));
    let b = TestPeer::spawn("peer-bbbbbb", Arc::new(b_connector.clone()));

    spawn_forwarder(a.outbox, b.handle.clone());
    spawn_forwarder(b.outbox, a.handle.clone());

    a.handle.connect_to(b.id.clone());

    wait_for_state(&a.handle, &b.id, LinkState::Connected, CONNECT_TIMEOUT_MS)
        .await
        .expect("offerer never connected");
    wait_for_state(&b.handle, &a.id, LinkState::Connected, CONNECT_TIMEOUT_MS)
        .await
        .expect("answerer never connected");

    // One offer out, one answer back, two candidates each way.
    let sent_by_a = a.signaling.sent();
    let sent_by_b = b.signaling.sent();
    assert_eq!(sent_by_a.len(), 3);
    assert_eq!(sent_by_b.len(), 3);

    match first_signal(&sent_by_a) {
        (SignalPayload::Description { sdp }, to) => {
            assert_eq!(sdp.kind, SdpKind::Offer);
            assert!(sdp.sdp.starts_with("v=0"));
            assert_eq!(to, Some(b.id.clone()));
        }
        other => panic!("expected offer first, got {:?}", other),
    }
    match first_signal(&sent_by_b) {
        (SignalPayload::Description { sdp }, to) => {
            assert_eq!(sdp.kind, SdpKind::Answer);
            assert_eq!(to, Some(a.id.clone()));
        }
        other => panic!("expected answer first, got {:?}", other),
    }

    assert_eq!(a_connector.connection_count(), 1);
    assert_eq!(b_connector.connection_count(), 1);
    let b_connection = b_connector.last_connection().unwrap();
    assert_eq!(b_connection.remote_candidates().len(), 2);
}
