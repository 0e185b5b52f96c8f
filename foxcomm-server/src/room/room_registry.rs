use crate::room::{Member, RegistryCommand, Room};
use crate::transport::{ConnectionSession, SessionId};
use crate::error::DeliveryError;
use foxcomm_core::{Envelope, PeerId, RoomId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub rooms: usize,
    pub sessions: usize,
}

/// In-memory room table.
///
/// Every session is in at most one room, and a room exists only while it has
/// members. The registry keeps clones of session handles but never owns the
/// connection itself; the transport layer decides when a session ends and
/// must call [`RoomRegistry::leave`] when it does.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<SessionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` to `room_id`, leaving its previous room first.
    ///
    /// Every other member of the room is told with `peer-joined`.
    pub fn join(&mut self, room_id: RoomId, session: ConnectionSession, peer_id: Option<PeerId>) {
        let session_id = session.id();

        if self.memberships.contains_key(&session_id) {
            debug!("{} re-joining, leaving current room first", session_id);
            self.leave(session_id);
        }

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating new room: {}", room_id);
            Room::new(room_id.clone())
        });

        if let Some(peer) = &peer_id {
            if room.has_peer(peer) {
                warn!("Peer id {} is already used in room {}", peer, room_id);
            }
        }

        room.insert(Member {
            session,
            peer_id: peer_id.clone(),
        });
        let size = room.len();
        self.memberships.insert(session_id, room_id.clone());
        info!("{} joined room {} as {:?} ({} members)", session_id, room_id, peer_id, size);

        self.broadcast(
            &room_id,
            &Envelope::PeerJoined { from: peer_id },
            Some(session_id),
        );
    }

    /// Remove the session from whatever room it is in. Calling this for a
    /// session that is in no room does nothing.
    pub fn leave(&mut self, session_id: SessionId) {
        let Some(room_id) = self.memberships.remove(&session_id) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };

        let departed = room.remove(session_id);
        info!("{} left room {}", session_id, room_id);

        if room.is_empty() {
            self.rooms.remove(&room_id);
            info!("Room {} is empty, removing", room_id);
            return;
        }

        let from = departed.and_then(|m| m.peer_id);
        self.broadcast(&room_id, &Envelope::PeerLeft { from }, None);
    }

    /// Best-effort delivery to every open member of the room except `exclude`.
    ///
    /// Returns how many members the message was queued for.
    pub fn broadcast(&self, room_id: &RoomId, message: &Envelope, exclude: Option<SessionId>) -> usize {
        let Some(room) = self.rooms.get(room_id) else {
            return 0;
        };

        let text: Arc<str> = match message.to_json() {
            Ok(json) => json.into(),
            Err(e) => {
                error!("Failed to serialize {} envelope: {}", message.kind(), e);
                return 0;
            }
        };

        let mut delivered = 0;
        for member in room.members() {
            let session = &member.session;
            if Some(session.id()) == exclude || !session.is_open() {
                continue;
            }
            match session.try_deliver(text.clone()) {
                Ok(()) => delivered += 1,
                Err(DeliveryError::QueueFull) => {
                    warn!("Dropping {} for {}: outbound queue full", message.kind(), session.id());
                }
                Err(DeliveryError::Closed) => {
                    debug!("Skipping {}: transport closed", session.id());
                }
            }
        }
        delivered
    }

    pub fn room_of(&self, session_id: SessionId) -> Option<&RoomId> {
        self.memberships.get(&session_id)
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<SessionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().map(|m| m.session.id()).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            rooms: self.rooms.len(),
            sessions: self.memberships.len(),
        }
    }

    /// Registry event loop. Commands are applied strictly in arrival order,
    /// which is what keeps join, leave and broadcast linearized.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<RegistryCommand>) {
        info!("Room registry started");

        while let Some(cmd) = command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Command channel closed. Room registry finished");
    }

    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::Join {
                room,
                session,
                peer_id,
            } => self.join(room, session, peer_id),

            RegistryCommand::Leave { session_id } => self.leave(session_id),

            RegistryCommand::Broadcast {
                room,
                message,
                exclude,
            } => {
                let delivered = self.broadcast(&room, &message, exclude);
                debug!("{} to room {} reached {} member(s)", message.kind(), room, delivered);
            }

            RegistryCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }
}
