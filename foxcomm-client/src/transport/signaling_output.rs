use async_trait::async_trait;
use foxcomm_core::Envelope;

/// Whatever carries envelopes from this client to the relay.
///
/// Implementations must send each envelope as one whole message even when
/// called concurrently from several peer links.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, envelope: Envelope) -> anyhow::Result<()>;
}
