use crate::error::RelayError;
use crate::room::RegistryHandle;
use crate::transport::{ConnectionSession, SessionId};
use foxcomm_core::{Envelope, PeerId, RoomId};
use tracing::{debug, warn};

/// Turns inbound envelopes into registry operations.
///
/// Bad input is logged and dropped; the only error that escapes is the
/// registry itself being gone.
#[derive(Debug, Clone)]
pub struct SignalingRelay {
    registry: RegistryHandle,
}

impl SignalingRelay {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub async fn handle_text(
        &self,
        session: &ConnectionSession,
        text: &str,
    ) -> Result<(), RelayError> {
        match Envelope::from_json(text) {
            Ok(envelope) => self.dispatch(session, envelope).await,
            Err(e) => {
                warn!("Dropping undecodable envelope from {}: {}", session.id(), e);
                Ok(())
            }
        }
    }

    pub async fn dispatch(
        &self,
        session: &ConnectionSession,
        envelope: Envelope,
    ) -> Result<(), RelayError> {
        match envelope {
            Envelope::Join { room, from } => {
                let Some(room) = non_empty_room(room) else {
                    warn!("Dropping join without room from {}", session.id());
                    return Ok(());
                };
                self.registry
                    .join(room, session.clone(), non_empty_peer(from))
                    .await
            }

            Envelope::Signal {
                room,
                from,
                to,
                payload,
            } => {
                let Some(room) = non_empty_room(room) else {
                    warn!("Dropping signal without room from {}", session.id());
                    return Ok(());
                };
                let Some(from) = non_empty_peer(from) else {
                    warn!("Dropping signal without sender id from {}", session.id());
                    return Ok(());
                };
                if payload.is_null() {
                    warn!("Dropping signal without payload from {}", session.id());
                    return Ok(());
                }

                let forwarded = Envelope::Signal {
                    room: None,
                    from: Some(from),
                    to,
                    payload,
                };
                self.registry
                    .broadcast(room, forwarded, Some(session.id()))
                    .await
            }

            Envelope::Leave { .. } => self.registry.leave(session.id()).await,

            other => {
                debug!(
                    "Ignoring server-side envelope type {} from {}",
                    other.kind(),
                    session.id()
                );
                Ok(())
            }
        }
    }

    /// Cleanup for a closed transport, whatever the reason it closed.
    pub async fn disconnect(&self, session_id: SessionId) -> Result<(), RelayError> {
        self.registry.leave(session_id).await
    }
}

fn non_empty_room(room: Option<RoomId>) -> Option<RoomId> {
    room.filter(|r| !r.is_empty())
}

fn non_empty_peer(peer: Option<PeerId>) -> Option<PeerId> {
    peer.filter(|p| !p.is_empty())
}
