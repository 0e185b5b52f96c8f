use foxcomm_core::{IceCandidate, SessionDescription};

#[derive(Debug)]
pub(crate) enum LinkCommand {
    /// Make and send an offer.
    Offer,
    RemoteDescription(SessionDescription),
    RemoteCandidate(IceCandidate),
    Close,
}
