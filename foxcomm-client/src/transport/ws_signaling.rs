use crate::transport::SignalingOutput;
use anyhow::{Context, Result};
use async_trait::async_trait;
use foxcomm_core::Envelope;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay connection over a WebSocket.
///
/// All writes go through one writer task, so concurrent senders never
/// interleave frames. Inbound envelopes arrive on the receiver returned by
/// [`WsSignaling::connect`]; it yields `None` once the socket is gone.
#[derive(Debug, Clone)]
pub struct WsSignaling {
    outbound: mpsc::UnboundedSender<Message>,
}

impl WsSignaling {
    pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<Envelope>)> {
        debug!("Connecting to relay: {}", url);

        let (ws, _response) = timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .context("Timed out connecting to relay")?
            .with_context(|| format!("Failed to connect to relay at {}", url))?;

        info!("Connected to relay at {}", url);

        let (mut write, mut read) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Envelope>();

        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = write.send(msg).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => match Envelope::from_json(&text) {
                        Ok(envelope) => {
                            if inbound_tx.send(envelope).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring malformed relay message: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay connection closed");
        });

        Ok((Self { outbound: outbound_tx }, inbound_rx))
    }

    /// Close the socket after any already queued messages.
    pub fn close(&self) {
        let _ = self.outbound.send(Message::Close(None));
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

#[async_trait]
impl SignalingOutput for WsSignaling {
    async fn send(&self, envelope: Envelope) -> Result<()> {
        let text = envelope.to_json()?;
        self.outbound
            .send(Message::Text(text.into()))
            .map_err(|_| anyhow::anyhow!("Relay connection is closed"))?;
        Ok(())
    }
}
