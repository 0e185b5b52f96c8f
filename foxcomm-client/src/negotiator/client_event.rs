use crate::error::NegotiationError;
use crate::negotiator::LinkState;
use foxcomm_core::PeerId;

/// What a client reports to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Someone joined the room. `peer` is absent when the relay did not say who.
    PeerJoined { peer: Option<PeerId> },
    PeerLeft { peer: Option<PeerId> },
    LinkState { peer: PeerId, state: LinkState },
    LinkClosed { peer: PeerId },
    NegotiationFailed { peer: PeerId, reason: NegotiationError },
    RemoteTrack {
        peer: PeerId,
        track_id: String,
        kind: String,
    },
    /// The relay connection is gone. Established links keep running.
    SignalingClosed,
}
