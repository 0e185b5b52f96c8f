use super::{LinkEventKind, LinkState, PeerLink};
use crate::error::NegotiationError;
use crate::transport::{MediaEvent, MediaState};
use tracing::{debug, info, warn};

impl PeerLink {
    pub(super) async fn handle_media_event(
        &mut self,
        event: MediaEvent,
    ) -> Result<(), NegotiationError> {
        match event {
            MediaEvent::LocalCandidate(candidate) => self.on_local_candidate(candidate).await,
            MediaEvent::StateChanged(state) => self.on_media_state(state),
            MediaEvent::Track { track_id, kind } => {
                info!("Track {} ({}) from {}", track_id, kind, self.remote);
                self.emit(LinkEventKind::Track { track_id, kind });
                Ok(())
            }
        }
    }

    fn on_media_state(&mut self, state: MediaState) -> Result<(), NegotiationError> {
        match state {
            MediaState::Connected => {
                self.set_state(LinkState::Connected);
                Ok(())
            }
            MediaState::Failed => Err(NegotiationError::TransportFailed),
            MediaState::Closed => {
                info!("Connection to {} closed", self.remote);
                self.closed = true;
                Ok(())
            }
            MediaState::Disconnected => {
                warn!("Connection to {} interrupted", self.remote);
                Ok(())
            }
            MediaState::New | MediaState::Connecting => {
                debug!("Connection to {} is {:?}", self.remote, state);
                Ok(())
            }
        }
    }
}
