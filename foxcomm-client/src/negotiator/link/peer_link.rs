use super::{LinkCommand, LinkEvent, LinkEventKind, LinkId, LinkState, Role};
use crate::error::NegotiationError;
use crate::transport::{MediaEvent, PeerConnection, PeerConnector, SignalingOutput};
use foxcomm_core::{IceCandidate, PeerId, RoomId};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cap on remote candidates held while no remote description is applied.
pub(crate) const MAX_PENDING_CANDIDATES: usize = 64;

const MEDIA_EVENT_CAPACITY: usize = 64;

/// Everything a link needs from its owner, shared by every link of one client.
#[derive(Clone)]
pub(crate) struct LinkContext {
    pub local: PeerId,
    pub room: RoomId,
    pub connector: Arc<dyn PeerConnector>,
    pub signaling: Arc<dyn SignalingOutput>,
    pub events: mpsc::UnboundedSender<LinkEvent>,
}

/// Negotiator-side handle to a running link.
pub(crate) struct LinkHandle {
    pub id: LinkId,
    command_tx: mpsc::UnboundedSender<LinkCommand>,
    task: JoinHandle<()>,
}

impl LinkHandle {
    pub fn send(&self, command: LinkCommand) {
        if self.command_tx.send(command).is_err() {
            debug!("Link {} already stopped", self.id);
        }
    }

    /// Ask the link to close and wait for it to release its connection.
    pub async fn close(self) {
        let _ = self.command_tx.send(LinkCommand::Close);
        if let Err(e) = self.task.await {
            warn!("Link {} task ended abnormally: {}", self.id, e);
        }
    }
}

/// Negotiation state for one remote peer.
///
/// Runs as its own task so that every remote peer progresses independently.
/// It owns the peer connection; the negotiator only ever talks to it through
/// [`LinkCommand`]s.
pub(crate) struct PeerLink {
    pub(super) id: LinkId,
    pub(super) remote: PeerId,
    pub(super) role: Role,
    pub(super) state: LinkState,
    pub(super) ctx: LinkContext,
    pub(super) connection: Option<Arc<dyn PeerConnection>>,
    pub(super) media_rx: mpsc::Receiver<MediaEvent>,
    pub(super) remote_description_applied: bool,
    pub(super) pending_remote_candidates: VecDeque<IceCandidate>,
    /// ICE username fragment of the last colliding offer we ignored.
    pub(super) ignored_ufrag: Option<String>,
    pub(super) local_description_sent: bool,
    pub(super) pending_local_candidates: Vec<IceCandidate>,
    pub(super) closed: bool,
}

impl PeerLink {
    /// Start a link for `remote`. Candidates that showed up before the link
    /// existed are handed over in `early_candidates`.
    pub fn spawn(
        ctx: LinkContext,
        remote: PeerId,
        role: Role,
        early_candidates: Vec<IceCandidate>,
    ) -> LinkHandle {
        let id = LinkId::next();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        // Replaced on the first connection.
        let (_, media_rx) = mpsc::channel(1);

        let link = PeerLink {
            id,
            remote,
            role,
            state: LinkState::Idle,
            ctx,
            connection: None,
            media_rx,
            remote_description_applied: false,
            pending_remote_candidates: early_candidates.into_iter().collect(),
            ignored_ufrag: None,
            local_description_sent: false,
            pending_local_candidates: Vec::new(),
            closed: false,
        };

        let task = tokio::spawn(link.run(command_rx));

        LinkHandle {
            id,
            command_tx,
            task,
        }
    }

    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<LinkCommand>) {
        debug!("Link {} to {} started as {:?}", self.id, self.remote, self.role);

        loop {
            let result = tokio::select! {
                command = command_rx.recv() => match command {
                    Some(LinkCommand::Close) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.media_rx.recv() => self.handle_media_event(event).await,
            };

            if let Err(error) = result {
                self.report_failure(error);
            }
            if self.closed {
                break;
            }
        }

        self.teardown().await;
        self.emit(LinkEventKind::Closed);
        debug!("Link {} to {} stopped", self.id, self.remote);
    }

    async fn handle_command(&mut self, command: LinkCommand) -> Result<(), NegotiationError> {
        match command {
            LinkCommand::Offer => self.start_offer().await,
            LinkCommand::RemoteDescription(desc) => self.apply_remote_description(desc).await,
            LinkCommand::RemoteCandidate(candidate) => self.add_remote_candidate(candidate).await,
            LinkCommand::Close => Ok(()),
        }
    }

    /// A fresh connection with its own media event channel. Anything the old
    /// connection still emits goes nowhere.
    pub(super) async fn reset_connection(
        &mut self,
    ) -> Result<Arc<dyn PeerConnection>, NegotiationError> {
        if let Some(old) = self.connection.take() {
            if let Err(e) = old.close().await {
                warn!("Failed to close previous connection to {}: {}", self.remote, e);
            }
        }

        let (media_tx, media_rx) = mpsc::channel(MEDIA_EVENT_CAPACITY);
        let connection = self
            .ctx
            .connector
            .connect(media_tx)
            .await
            .map_err(|e| NegotiationError::Connect(e.to_string()))?;

        self.media_rx = media_rx;
        self.connection = Some(connection.clone());
        self.remote_description_applied = false;
        self.local_description_sent = false;
        self.pending_local_candidates.clear();

        Ok(connection)
    }

    pub(super) fn set_state(&mut self, state: LinkState) {
        if self.state == state {
            return;
        }
        if self.state == LinkState::Connected && state == LinkState::Connecting {
            return;
        }

        info!("Link to {}: {:?} -> {:?}", self.remote, self.state, state);
        self.state = state;
        self.emit(LinkEventKind::StateChanged(state));
    }

    pub(super) fn is_polite(&self) -> bool {
        self.ctx.local < self.remote
    }

    pub(super) fn report_failure(&mut self, error: NegotiationError) {
        let fatal = error.is_fatal();
        if fatal {
            warn!("Negotiation with {} failed: {}", self.remote, error);
            self.closed = true;
        } else {
            warn!("Negotiation with {} hit a recoverable error: {}", self.remote, error);
        }
        self.emit(LinkEventKind::Failed { error, fatal });
    }

    pub(super) fn emit(&self, kind: LinkEventKind) {
        let _ = self.ctx.events.send(LinkEvent {
            peer: self.remote.clone(),
            link_id: self.id,
            kind,
        });
    }

    async fn teardown(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                warn!("Failed to close connection to {}: {}", self.remote, e);
            }
        }
        self.pending_remote_candidates.clear();
        self.pending_local_candidates.clear();
    }
}
