use foxcomm_core::Envelope;
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{
    ENVELOPE_TIMEOUT_MS, SILENCE_WINDOW_MS, WsTestClient, spawn_test_relay, wait_for_sessions,
};

#[tokio::test]
async fn test_signal_reaches_other_peer() {
    init_tracing();

    let addr = spawn_test_relay().await.expect("Failed to start relay");

    let mut s1 = WsTestClient::connect(addr, "peer-s1").await.unwrap();
    s1.join("demo").await.unwrap();
    wait_for_sessions(addr, 1, ENVELOPE_TIMEOUT_MS).await.unwrap();

    let mut s2 = WsTestClient::connect(addr, "peer-s2").await.unwrap();
    s2.join("demo").await.unwrap();

    // Exactly one peer-joined, and it is about S2.
    let joined = s1.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap();
    assert_eq!(
        joined,
        Envelope::PeerJoined {
            from: Some("peer-s2".into())
        }
    );

    let payload = json!({"sdp": {"type": "offer", "sdp": "v=0..."}});
    s1.send_raw(
        &json!({
            "type": "signal",
            "room": "demo",
            "from": "peer-s1",
            "payload": payload,
        })
        .to_string(),
    )
    .await
    .unwrap();

    let received = s2.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap();
    let Envelope::Signal {
        from,
        payload: got,
        ..
    } = received
    else {
        panic!("S2 expected a signal, got {:?}", received);
    };
    assert_eq!(from, Some("peer-s1".into()));
    assert_eq!(got, payload);

    s1.expect_silence(SILENCE_WINDOW_MS)
        .await
        .expect("S1 must not receive its own echo");
    s2.expect_silence(SILENCE_WINDOW_MS)
        .await
        .expect("S2 must receive exactly one copy");
}
