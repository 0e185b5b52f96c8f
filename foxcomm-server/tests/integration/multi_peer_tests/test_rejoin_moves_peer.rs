use foxcomm_core::Envelope;

use crate::integration::init_tracing;
use crate::utils::{
    ENVELOPE_TIMEOUT_MS, SILENCE_WINDOW_MS, WsTestClient, fetch_health, spawn_test_relay,
    wait_for_sessions,
};

#[tokio::test]
async fn test_rejoin_moves_peer() {
    init_tracing();

    let addr = spawn_test_relay().await.expect("Failed to start relay");

    let mut in_x = WsTestClient::connect(addr, "in-x").await.unwrap();
    in_x.join("x").await.unwrap();
    let mut in_y = WsTestClient::connect(addr, "in-y").await.unwrap();
    in_y.join("y").await.unwrap();
    wait_for_sessions(addr, 2, ENVELOPE_TIMEOUT_MS).await.unwrap();

    let mut mover = WsTestClient::connect(addr, "mover").await.unwrap();
    mover.join("x").await.unwrap();
    assert_eq!(
        in_x.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap(),
        Envelope::PeerJoined { from: Some("mover".into()) }
    );

    mover.join("y").await.unwrap();
    assert_eq!(
        in_x.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap(),
        Envelope::PeerLeft { from: Some("mover".into()) }
    );
    assert_eq!(
        in_y.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap(),
        Envelope::PeerJoined { from: Some("mover".into()) }
    );

    // A signal sent in room x no longer reaches the mover.
    in_x.send_envelope(&Envelope::Signal {
        room: Some("x".into()),
        from: Some("in-x".into()),
        to: None,
        payload: serde_json::json!({"candidate": {"candidate": "c"}}),
    })
    .await
    .unwrap();
    mover.expect_silence(SILENCE_WINDOW_MS).await.unwrap();

    let health = fetch_health(addr).await.unwrap();
    assert_eq!(health["rooms"], 2);
    assert_eq!(health["sessions"], 3);
}
