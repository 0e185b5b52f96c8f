use crate::negotiator::link::{LinkCommand, LinkContext, LinkEvent, LinkHandle, PeerLink, Role};
use crate::negotiator::{ClientEvent, LinkState, NegotiatorCommand, NegotiatorHandle};
use crate::transport::{PeerConnector, SignalingOutput};
use dashmap::DashMap;
use foxcomm_core::{IceCandidate, PeerId, RoomId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Client-side owner of every peer link in one room.
///
/// Routes relay envelopes to the right [`PeerLink`], creates links when a
/// peer must be reached and drops them when they end. Runs as a single task;
/// links run beside it and report back over one event channel.
pub struct Negotiator {
    pub(super) ctx: LinkContext,
    pub(super) links: HashMap<PeerId, LinkHandle>,
    /// Candidates from peers we have no link with yet.
    pub(super) orphan_candidates: HashMap<PeerId, Vec<IceCandidate>>,
    pub(super) states: Arc<DashMap<PeerId, LinkState>>,
    pub(super) client_tx: mpsc::UnboundedSender<ClientEvent>,
}

impl Negotiator {
    pub fn spawn(
        local: PeerId,
        room: RoomId,
        connector: Arc<dyn PeerConnector>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> (NegotiatorHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let states = Arc::new(DashMap::new());

        let negotiator = Negotiator {
            ctx: LinkContext {
                local,
                room,
                connector,
                signaling,
                events: link_tx,
            },
            links: HashMap::new(),
            orphan_candidates: HashMap::new(),
            states: states.clone(),
            client_tx,
        };

        tokio::spawn(negotiator.run(command_rx, link_rx));

        (NegotiatorHandle::new(command_tx, states), client_rx)
    }

    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<NegotiatorCommand>,
        mut link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    ) {
        info!("Negotiator for {} in {} started", self.ctx.local, self.ctx.room);

        loop {
            tokio::select! {
                cmd = command_rx.recv() => match cmd {
                    Some(NegotiatorCommand::Shutdown { done }) => {
                        self.shutdown_links().await;
                        let _ = done.send(());
                        break;
                    }
                    Some(c) => self.handle_command(c).await,
                    None => {
                        self.shutdown_links().await;
                        break;
                    }
                },
                Some(event) = link_rx.recv() => self.handle_link_event(event),
            }
        }

        info!("Negotiator for {} stopped", self.ctx.local);
    }

    async fn handle_command(&mut self, command: NegotiatorCommand) {
        match command {
            NegotiatorCommand::Inbound(envelope) => self.handle_envelope(envelope).await,
            NegotiatorCommand::ConnectTo(peer) => self.connect_to(peer).await,
            NegotiatorCommand::Disconnect(peer) => self.disconnect(&peer),
            NegotiatorCommand::CloseAll => self.close_all(),
            NegotiatorCommand::SignalingClosed => {
                info!("Relay connection closed");
                self.emit(ClientEvent::SignalingClosed);
            }
            NegotiatorCommand::Shutdown { .. } => {}
        }
    }

    pub(super) async fn connect_to(&mut self, peer: PeerId) {
        if peer == self.ctx.local {
            debug!("Not connecting to ourselves");
            return;
        }
        self.replace_link(peer, Role::Offerer)
            .send(LinkCommand::Offer);
    }

    /// Start a new link for `peer`, closing any existing one first.
    pub(super) fn replace_link(&mut self, peer: PeerId, role: Role) -> &LinkHandle {
        if let Some(old) = self.links.remove(&peer) {
            debug!("Replacing link {} to {}", old.id, peer);
            tokio::spawn(old.close());
        }

        let early = self.orphan_candidates.remove(&peer).unwrap_or_default();
        let handle = PeerLink::spawn(self.ctx.clone(), peer.clone(), role, early);
        debug!("Link {} to {} created as {:?}", handle.id, peer, role);

        self.states.insert(peer.clone(), LinkState::Idle);
        self.links.entry(peer).insert_entry(handle).into_mut()
    }

    /// Forget `peer` and close its link in the background.
    pub(super) fn disconnect(&mut self, peer: &PeerId) {
        self.orphan_candidates.remove(peer);
        self.states.remove(peer);
        if let Some(handle) = self.links.remove(peer) {
            info!("Closing link to {}", peer);
            tokio::spawn(handle.close());
            self.emit(ClientEvent::LinkClosed { peer: peer.clone() });
        }
    }

    fn close_all(&mut self) {
        self.orphan_candidates.clear();
        let peers: Vec<PeerId> = self.links.keys().cloned().collect();
        for peer in peers {
            self.disconnect(&peer);
        }
    }

    /// Close every link and wait until each has torn down its connection.
    async fn shutdown_links(&mut self) {
        self.orphan_candidates.clear();
        let closing: Vec<(PeerId, LinkHandle)> = self.links.drain().collect();
        for (peer, handle) in closing {
            self.states.remove(&peer);
            handle.close().await;
            self.emit(ClientEvent::LinkClosed { peer });
        }
    }

    pub(super) fn emit(&self, event: ClientEvent) {
        let _ = self.client_tx.send(event);
    }
}
