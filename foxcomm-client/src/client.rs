use crate::config::ClientConfig;
use crate::negotiator::{ClientEvent, Negotiator, NegotiatorHandle};
use crate::transport::{PeerConnector, SignalingOutput, WsSignaling};
use anyhow::{Context, Result};
use foxcomm_core::{Envelope, PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A room member: one relay connection plus a negotiator for the peers in
/// the room.
pub struct Client {
    peer_id: PeerId,
    room: RoomId,
    signaling: WsSignaling,
    negotiator: NegotiatorHandle,
    events: mpsc::UnboundedReceiver<ClientEvent>,
    pump: JoinHandle<()>,
}

impl Client {
    /// Dial the relay and join the configured room.
    pub async fn connect(config: ClientConfig, connector: Arc<dyn PeerConnector>) -> Result<Self> {
        let url = config.relay_url().context("Invalid client configuration")?;
        let ClientConfig { peer_id, room, .. } = config;

        let (signaling, mut inbound) = WsSignaling::connect(&url).await?;
        let output: Arc<dyn SignalingOutput> = Arc::new(signaling.clone());

        let (negotiator, events) =
            Negotiator::spawn(peer_id.clone(), room.clone(), connector, output.clone());

        output
            .send(Envelope::join(room.clone(), peer_id.clone()))
            .await
            .context("Failed to send join")?;
        info!("Joined room {} as {}", room, peer_id);

        let router = negotiator.clone();
        let pump = tokio::spawn(async move {
            while let Some(envelope) = inbound.recv().await {
                debug!("Relay -> {}", envelope.kind());
                router.handle_envelope(envelope);
            }
            router.signaling_closed();
        });

        Ok(Self {
            peer_id,
            room,
            signaling,
            negotiator,
            events,
            pump,
        })
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn negotiator(&self) -> &NegotiatorHandle {
        &self.negotiator
    }

    pub fn connect_to(&self, peer: PeerId) {
        self.negotiator.connect_to(peer);
    }

    /// Leave the room and drop every link. The relay connection stays open.
    pub async fn leave(&self) -> Result<()> {
        self.signaling
            .send(Envelope::leave(self.room.clone()))
            .await
            .context("Failed to send leave")?;
        self.negotiator.close_all();
        Ok(())
    }

    pub async fn shutdown(self) {
        self.negotiator.shutdown().await;
        self.signaling.close();
        self.pump.abort();
        info!("Client {} shut down", self.peer_id);
    }
}
