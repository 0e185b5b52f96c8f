use crate::error::RelayError;
use crate::room::{RegistryCommand, RegistryStats, RoomRegistry};
use crate::transport::{ConnectionSession, SessionId};
use foxcomm_core::{Envelope, PeerId, RoomId};
use tokio::sync::{mpsc, oneshot};

/// Cloneable front door to the registry actor.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    command_tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Start a fresh registry on the current runtime.
    pub fn spawn(capacity: usize) -> Self {
        let (command_tx, command_rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(RoomRegistry::new().run(command_rx));
        Self { command_tx }
    }

    pub async fn join(
        &self,
        room: RoomId,
        session: ConnectionSession,
        peer_id: Option<PeerId>,
    ) -> Result<(), RelayError> {
        self.send(RegistryCommand::Join {
            room,
            session,
            peer_id,
        })
        .await
    }

    pub async fn leave(&self, session_id: SessionId) -> Result<(), RelayError> {
        self.send(RegistryCommand::Leave { session_id }).await
    }

    pub async fn broadcast(
        &self,
        room: RoomId,
        message: Envelope,
        exclude: Option<SessionId>,
    ) -> Result<(), RelayError> {
        self.send(RegistryCommand::Broadcast {
            room,
            message,
            exclude,
        })
        .await
    }

    pub async fn stats(&self) -> Result<RegistryStats, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::Stats { reply }).await?;
        rx.await.map_err(|_| RelayError::RegistryUnavailable)
    }

    async fn send(&self, cmd: RegistryCommand) -> Result<(), RelayError> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| RelayError::RegistryUnavailable)
    }
}
