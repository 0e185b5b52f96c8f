use anyhow::Result;
use async_trait::async_trait;
use foxcomm_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a peer connection raises on its own schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LocalCandidate(IceCandidate),
    StateChanged(MediaState),
    Track { track_id: String, kind: String },
}

/// Factory for peer connections. ICE server settings live in the connector.
#[async_trait]
pub trait PeerConnector: Send + Sync + 'static {
    /// Create a connection that reports its events on `events`.
    async fn connect(&self, events: mpsc::Sender<MediaEvent>) -> Result<Arc<dyn PeerConnection>>;
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
