use super::{LinkId, LinkState};
use crate::error::NegotiationError;
use foxcomm_core::PeerId;

/// Report from a peer link back to the negotiator.
#[derive(Debug)]
pub(crate) struct LinkEvent {
    pub peer: PeerId,
    pub link_id: LinkId,
    pub kind: LinkEventKind,
}

#[derive(Debug)]
pub(crate) enum LinkEventKind {
    StateChanged(LinkState),
    Failed {
        error: NegotiationError,
        fatal: bool,
    },
    Track {
        track_id: String,
        kind: String,
    },
    Closed,
}
