use crate::negotiator::{LinkState, NegotiatorCommand};
use dashmap::DashMap;
use foxcomm_core::{Envelope, PeerId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cloneable front door to a running [`Negotiator`](crate::Negotiator).
#[derive(Clone)]
pub struct NegotiatorHandle {
    command_tx: mpsc::UnboundedSender<NegotiatorCommand>,
    states: Arc<DashMap<PeerId, LinkState>>,
}

impl NegotiatorHandle {
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<NegotiatorCommand>,
        states: Arc<DashMap<PeerId, LinkState>>,
    ) -> Self {
        Self { command_tx, states }
    }

    /// Feed an envelope received from the relay.
    pub fn handle_envelope(&self, envelope: Envelope) {
        self.send(NegotiatorCommand::Inbound(envelope));
    }

    /// Greet a peer known by other means by sending it an offer.
    pub fn connect_to(&self, peer: PeerId) {
        self.send(NegotiatorCommand::ConnectTo(peer));
    }

    pub fn disconnect(&self, peer: PeerId) {
        self.send(NegotiatorCommand::Disconnect(peer));
    }

    pub fn close_all(&self) {
        self.send(NegotiatorCommand::CloseAll);
    }

    pub fn signaling_closed(&self) {
        self.send(NegotiatorCommand::SignalingClosed);
    }

    /// Close every link and stop the negotiator. Returns once all peer
    /// connections have been released.
    pub async fn shutdown(&self) {
        let (done, wait) = oneshot::channel();
        if self
            .command_tx
            .send(NegotiatorCommand::Shutdown { done })
            .is_ok()
        {
            let _ = wait.await;
        }
    }

    pub fn link_state(&self, peer: &PeerId) -> Option<LinkState> {
        self.states.get(peer).map(|entry| *entry.value())
    }

    pub fn links(&self) -> Vec<(PeerId, LinkState)> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    fn send(&self, command: NegotiatorCommand) {
        let _ = self.command_tx.send(command);
    }
}
