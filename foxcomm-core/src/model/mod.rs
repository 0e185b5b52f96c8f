mod envelope;
mod peer;
mod room;
mod signaling;

pub use envelope::Envelope;
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalPayload};
