use foxcomm_core::{Envelope, PeerId};
use tokio::sync::oneshot;

#[derive(Debug)]
pub(crate) enum NegotiatorCommand {
    Inbound(Envelope),
    ConnectTo(PeerId),
    Disconnect(PeerId),
    CloseAll,
    SignalingClosed,
    Shutdown { done: oneshot::Sender<()> },
}
