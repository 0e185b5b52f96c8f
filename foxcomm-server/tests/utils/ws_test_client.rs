use anyhow::{Context, Result};
use foxcomm_core::Envelope;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Raw WebSocket peer speaking the relay's JSON envelopes.
pub struct WsTestClient {
    pub name: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    pub async fn connect(addr: SocketAddr, name: &str) -> Result<Self> {
        let url = format!("ws://{}/", addr);
        let (stream, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to connect {} to {}", name, url))?;
        Ok(Self {
            name: name.to_owned(),
            stream,
        })
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(Message::text(text.to_owned()))
            .await
            .context("Failed to send text frame")
    }

    pub async fn send_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        let json = envelope.to_json()?;
        self.send_raw(&json).await
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        let envelope = Envelope::join(room.into(), self.name.as_str().into());
        self.send_envelope(&envelope).await
    }

    /// Next envelope, or an error after `timeout_ms`.
    pub async fn recv_envelope(&mut self, timeout_ms: u64) -> Result<Envelope> {
        let deadline = Duration::from_millis(timeout_ms);
        loop {
            let next = tokio::time::timeout(deadline, self.stream.next())
                .await
                .with_context(|| format!("{} timed out waiting for an envelope", self.name))?;
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Envelope::from_json(text.as_str()).context("Relay sent bad JSON");
                }
                Some(Ok(Message::Close(_))) | None => anyhow::bail!("Relay closed the connection"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("WebSocket error"),
            }
        }
    }

    /// Succeeds only if nothing arrives within `window_ms`.
    pub async fn expect_silence(&mut self, window_ms: u64) -> Result<()> {
        match tokio::time::timeout(Duration::from_millis(window_ms), self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => {
                anyhow::bail!("{} unexpectedly received {}", self.name, text.as_str())
            }
            Ok(other) => anyhow::bail!("{} unexpectedly received {:?}", self.name, other),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.context("Failed to close")?;
        Ok(())
    }
}
