use crate::negotiator::link::{LinkCommand, MAX_PENDING_CANDIDATES, Role};
use crate::negotiator::{ClientEvent, Negotiator};
use foxcomm_core::{Envelope, IceCandidate, PeerId, SdpKind, SessionDescription, SignalPayload};
use serde_json::Value;
use tracing::{debug, info, warn};

impl Negotiator {
    pub(super) async fn handle_envelope(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::PeerJoined { from } => self.on_peer_joined(from).await,
            Envelope::PeerLeft { from } => self.on_peer_left(from).await,
            Envelope::Signal {
                from, to, payload, ..
            } => self.on_signal(from, to, payload),
            other => debug!("Ignoring {} envelope from relay", other.kind()),
        }
    }

    async fn on_peer_joined(&mut self, from: Option<PeerId>) {
        self.emit(ClientEvent::PeerJoined { peer: from.clone() });

        let Some(peer) = from else {
            warn!("Peer joined without an identifier, cannot address an offer to it");
            return;
        };
        if peer == self.ctx.local {
            return;
        }

        info!("Peer {} joined, sending offer", peer);
        self.connect_to(peer).await;
    }

    async fn on_peer_left(&mut self, from: Option<PeerId>) {
        self.emit(ClientEvent::PeerLeft { peer: from.clone() });

        match from {
            Some(peer) => {
                info!("Peer {} left", peer);
                self.disconnect(&peer);
            }
            None => debug!("Anonymous peer left"),
        }
    }

    fn on_signal(&mut self, from: Option<PeerId>, to: Option<PeerId>, payload: Value) {
        if let Some(to) = &to {
            if *to != self.ctx.local {
                debug!("Signal addressed to {}, not us", to);
                return;
            }
        }
        let Some(from) = from.filter(|peer| !peer.is_empty()) else {
            warn!("Dropping signal without sender");
            return;
        };
        if from == self.ctx.local {
            return;
        }

        let payload = match serde_json::from_value::<SignalPayload>(payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping undecodable signal from {}: {}", from, e);
                return;
            }
        };

        match payload {
            SignalPayload::Description { sdp } => self.on_remote_description(from, sdp),
            SignalPayload::Candidate { candidate } => self.on_remote_candidate(from, candidate),
        }
    }

    fn on_remote_description(&mut self, from: PeerId, desc: SessionDescription) {
        if let Some(link) = self.links.get(&from) {
            link.send(LinkCommand::RemoteDescription(desc));
            return;
        }

        if desc.kind != SdpKind::Offer {
            debug!("{:?} from {} with no link, ignoring", desc.kind, from);
            return;
        }

        info!("Offer from {}, answering", from);
        self.replace_link(from, Role::Answerer)
            .send(LinkCommand::RemoteDescription(desc));
    }

    fn on_remote_candidate(&mut self, from: PeerId, candidate: IceCandidate) {
        if let Some(link) = self.links.get(&from) {
            link.send(LinkCommand::RemoteCandidate(candidate));
            return;
        }

        let pending = self.orphan_candidates.entry(from.clone()).or_default();
        if pending.len() >= MAX_PENDING_CANDIDATES {
            warn!("Too many candidates from unknown peer {}, dropping", from);
            return;
        }
        debug!("Holding candidate from {} until its offer arrives", from);
        pending.push(candidate);
    }
}
