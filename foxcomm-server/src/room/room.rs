use crate::transport::{ConnectionSession, SessionId};
use foxcomm_core::{PeerId, RoomId};
use std::collections::HashMap;

/// A joined session together with the identifier it announced.
#[derive(Debug, Clone)]
pub struct Member {
    pub session: ConnectionSession,
    pub peer_id: Option<PeerId>,
}

/// Named group of sessions. Only the registry creates or mutates these.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: HashMap<SessionId, Member>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            members: HashMap::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub(crate) fn insert(&mut self, member: Member) {
        self.members.insert(member.session.id(), member);
    }

    pub(crate) fn remove(&mut self, session_id: SessionId) -> Option<Member> {
        self.members.remove(&session_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn has_peer(&self, peer_id: &PeerId) -> bool {
        self.members
            .values()
            .any(|m| m.peer_id.as_ref() == Some(peer_id))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
