use thiserror::Error;

/// Why a single peer negotiation went wrong. Reported to the local client
/// only; other links and the relay connection are unaffected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("failed to create peer connection: {0}")]
    Connect(String),

    #[error("failed to create offer: {0}")]
    CreateOffer(String),

    #[error("failed to create answer: {0}")]
    CreateAnswer(String),

    #[error("failed to apply local description: {0}")]
    LocalDescription(String),

    #[error("failed to apply remote description: {0}")]
    RemoteDescription(String),

    #[error("failed to add ICE candidate: {0}")]
    Candidate(String),

    #[error("failed to send signal: {0}")]
    Signaling(String),

    #[error("media transport failed")]
    TransportFailed,
}

impl NegotiationError {
    /// Whether the link cannot continue after this error. Candidate and
    /// signaling hiccups are survivable; a rejected description is not.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            NegotiationError::Candidate(_) | NegotiationError::Signaling(_)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("relay url is empty")]
    EmptyUrl,

    #[error("unsupported relay url scheme in {0:?}, expected ws:// or wss://")]
    UnsupportedScheme(String),

    #[error("room name is empty")]
    EmptyRoom,

    #[error("peer id is empty")]
    EmptyPeerId,
}
