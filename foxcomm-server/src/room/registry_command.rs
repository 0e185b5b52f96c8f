use crate::room::RegistryStats;
use crate::transport::{ConnectionSession, SessionId};
use foxcomm_core::{Envelope, PeerId, RoomId};
use tokio::sync::oneshot;

/// Requests handled, one at a time, by the registry actor.
#[derive(Debug)]
pub enum RegistryCommand {
    Join {
        room: RoomId,
        session: ConnectionSession,
        peer_id: Option<PeerId>,
    },

    Leave { session_id: SessionId },

    Broadcast {
        room: RoomId,
        message: Envelope,
        exclude: Option<SessionId>,
    },

    Stats { reply: oneshot::Sender<RegistryStats> },
}
