use foxcomm_core::Envelope;
use foxcomm_server::RelayConfig;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{ENVELOPE_TIMEOUT_MS, WsTestClient, spawn_test_relay_with, wait_for_sessions};

const BLOB_BYTES: usize = 128 * 1024;
const MAX_SIGNALS: usize = 800;

#[tokio::test]
async fn test_stalled_member_is_dropped() {
    init_tracing();

    let addr = spawn_test_relay_with(RelayConfig {
        outbound_capacity: 8,
        send_timeout: Duration::from_millis(500),
        ..RelayConfig::default()
    })
    .await
    .expect("Failed to start relay");

    let mut reader = WsTestClient::connect(addr, "reader").await.unwrap();
    reader.join("demo").await.unwrap();
    wait_for_sessions(addr, 1, ENVELOPE_TIMEOUT_MS).await.unwrap();

    // Joins, then never reads another frame.
    let mut stalled = WsTestClient::connect(addr, "stalled").await.unwrap();
    stalled.join("demo").await.unwrap();
    let mut flooder = WsTestClient::connect(addr, "flooder").await.unwrap();
    flooder.join("demo").await.unwrap();
    wait_for_sessions(addr, 3, ENVELOPE_TIMEOUT_MS).await.unwrap();

    for name in ["stalled", "flooder"] {
        assert_eq!(
            reader.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap(),
            Envelope::PeerJoined {
                from: Some(name.into())
            }
        );
    }

    // Count signals until the relay gives up on the stalled member.
    let reading = tokio::spawn(async move {
        let mut signals = 0usize;
        loop {
            match reader.recv_envelope(ENVELOPE_TIMEOUT_MS).await? {
                Envelope::Signal { .. } => signals += 1,
                Envelope::PeerLeft { from }
                    if from.as_ref().map(|p| p.as_str()) == Some("stalled") =>
                {
                    return anyhow::Ok((reader, signals));
                }
                other => anyhow::bail!("reader got unexpected {:?}", other),
            }
        }
    });

    let blob = Envelope::Signal {
        room: Some("demo".into()),
        from: Some("flooder".into()),
        to: None,
        payload: serde_json::json!({ "blob": "x".repeat(BLOB_BYTES) }),
    }
    .to_json()
    .unwrap();
    for _ in 0..MAX_SIGNALS {
        if reading.is_finished() {
            break;
        }
        flooder.send_raw(&blob).await.unwrap();
    }

    let (mut reader, signals) = tokio::time::timeout(Duration::from_secs(20), reading)
        .await
        .expect("stalled member was never dropped")
        .unwrap()
        .unwrap();
    assert!(signals > 0, "reader starved while the stalled member was connected");
    wait_for_sessions(addr, 2, ENVELOPE_TIMEOUT_MS).await.unwrap();

    // The remaining members still talk to each other.
    flooder
        .send_envelope(&Envelope::Signal {
            room: Some("demo".into()),
            from: Some("flooder".into()),
            to: None,
            payload: serde_json::json!({ "done": true }),
        })
        .await
        .unwrap();
    loop {
        match reader.recv_envelope(ENVELOPE_TIMEOUT_MS).await.unwrap() {
            Envelope::Signal { payload, .. } if payload["done"] == true => break,
            Envelope::Signal { .. } => continue,
            other => panic!("reader got unexpected {:?}", other),
        }
    }

    drop(stalled);
}
