use crate::model::{PeerId, RoomId, SignalPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One relay message, tagged by `type` on the wire.
///
/// Every field except the tag is optional at decode time so that the relay
/// can decide for itself what counts as malformed. `payload` stays an opaque
/// JSON value: the relay re-encodes it without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Envelope {
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<RoomId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    Signal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<RoomId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        payload: Value,
    },
    Leave {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<RoomId>,
    },
    PeerJoined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    PeerLeft {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
}

impl Envelope {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn join(room: RoomId, from: PeerId) -> Self {
        Envelope::Join {
            room: Some(room),
            from: Some(from),
        }
    }

    pub fn leave(room: RoomId) -> Self {
        Envelope::Leave { room: Some(room) }
    }

    /// Client-originated `signal` carrying a typed payload.
    pub fn signal(
        room: RoomId,
        from: PeerId,
        to: Option<PeerId>,
        payload: &SignalPayload,
    ) -> serde_json::Result<Self> {
        Ok(Envelope::Signal {
            room: Some(room),
            from: Some(from),
            to,
            payload: serde_json::to_value(payload)?,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Join { .. } => "join",
            Envelope::Signal { .. } => "signal",
            Envelope::Leave { .. } => "leave",
            Envelope::PeerJoined { .. } => "peer-joined",
            Envelope::PeerLeft { .. } => "peer-left",
        }
    }
}
