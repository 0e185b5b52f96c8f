use crate::negotiator::link::{LinkEvent, LinkEventKind};
use crate::negotiator::{ClientEvent, Negotiator};
use tracing::debug;

impl Negotiator {
    /// Events from links that were closed or replaced are dropped here.
    pub(super) fn handle_link_event(&mut self, event: LinkEvent) {
        let current = self
            .links
            .get(&event.peer)
            .is_some_and(|link| link.id == event.link_id);
        if !current {
            debug!("Stale event from {} for {}", event.link_id, event.peer);
            return;
        }

        let peer = event.peer;
        match event.kind {
            LinkEventKind::StateChanged(state) => {
                self.states.insert(peer.clone(), state);
                self.emit(ClientEvent::LinkState { peer, state });
            }
            LinkEventKind::Failed { error, fatal } => {
                if fatal {
                    debug!("Link {} to {} is shutting down", event.link_id, peer);
                }
                self.emit(ClientEvent::NegotiationFailed {
                    peer,
                    reason: error,
                });
            }
            LinkEventKind::Track { track_id, kind } => {
                self.emit(ClientEvent::RemoteTrack {
                    peer,
                    track_id,
                    kind,
                });
            }
            LinkEventKind::Closed => {
                self.links.remove(&peer);
                self.states.remove(&peer);
                self.emit(ClientEvent::LinkClosed { peer });
            }
        }
    }
}
