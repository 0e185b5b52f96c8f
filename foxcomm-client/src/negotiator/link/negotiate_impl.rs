use super::candidate_impl::{candidate_ufrag, description_ufrag};
use super::{LinkState, PeerLink, Role};
use crate::error::NegotiationError;
use foxcomm_core::{Envelope, SdpKind, SessionDescription, SignalPayload};
use tracing::{debug, warn};

impl PeerLink {
    pub(super) async fn start_offer(&mut self) -> Result<(), NegotiationError> {
        let connection = self.reset_connection().await?;
        self.role = Role::Offerer;
        self.set_state(LinkState::Offering);

        let offer = connection
            .create_offer()
            .await
            .map_err(|e| NegotiationError::CreateOffer(e.to_string()))?;
        connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| NegotiationError::LocalDescription(e.to_string()))?;

        self.send_description(offer).await
    }

    pub(super) async fn apply_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        match desc.kind {
            SdpKind::Offer => self.accept_offer(desc).await,
            SdpKind::Answer | SdpKind::Pranswer => self.accept_answer(desc).await,
            SdpKind::Rollback => {
                warn!("Ignoring rollback from {}", self.remote);
                Ok(())
            }
        }
    }

    /// Answer a remote offer. Any negotiation already under way is dropped
    /// and the connection is rebuilt, except when both sides offered at once
    /// and this side is the impolite one: then its own offer stands, and the
    /// candidates gathered for the ignored offer are discarded with it.
    async fn accept_offer(&mut self, offer: SessionDescription) -> Result<(), NegotiationError> {
        if self.state == LinkState::Offering && !self.is_polite() {
            debug!("Offer collision with {}, keeping our own offer", self.remote);
            if let Some(ufrag) = description_ufrag(&offer.sdp) {
                self.pending_remote_candidates
                    .retain(|c| candidate_ufrag(c) != Some(ufrag));
                self.ignored_ufrag = Some(ufrag.to_owned());
            }
            return Ok(());
        }
        if self.state != LinkState::Idle {
            debug!("Restarting negotiation with {} from {:?}", self.remote, self.state);
        }

        let connection = self.reset_connection().await?;
        self.role = Role::Answerer;
        self.set_state(LinkState::Answering);

        connection
            .set_remote_description(offer)
            .await
            .map_err(|e| NegotiationError::RemoteDescription(e.to_string()))?;
        self.remote_description_applied = true;
        self.flush_remote_candidates().await;

        let answer = connection
            .create_answer()
            .await
            .map_err(|e| NegotiationError::CreateAnswer(e.to_string()))?;
        connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| NegotiationError::LocalDescription(e.to_string()))?;

        self.send_description(answer).await?;
        self.set_state(LinkState::Connecting);
        Ok(())
    }

    async fn accept_answer(&mut self, answer: SessionDescription) -> Result<(), NegotiationError> {
        let Some(connection) = self.connection.clone() else {
            debug!("Answer from {} before any offer, ignoring", self.remote);
            return Ok(());
        };
        if self.state != LinkState::Offering {
            debug!("Unexpected answer from {} in {:?}, ignoring", self.remote, self.state);
            return Ok(());
        }

        connection
            .set_remote_description(answer)
            .await
            .map_err(|e| NegotiationError::RemoteDescription(e.to_string()))?;
        self.remote_description_applied = true;
        self.flush_remote_candidates().await;

        self.set_state(LinkState::Connecting);
        Ok(())
    }

    /// Send our description, then whatever candidates piled up behind it.
    async fn send_description(&mut self, desc: SessionDescription) -> Result<(), NegotiationError> {
        self.send_payload(&SignalPayload::Description { sdp: desc })
            .await?;
        self.local_description_sent = true;

        for candidate in std::mem::take(&mut self.pending_local_candidates) {
            self.send_payload(&SignalPayload::Candidate { candidate })
                .await?;
        }
        Ok(())
    }

    pub(super) async fn send_payload(
        &self,
        payload: &SignalPayload,
    ) -> Result<(), NegotiationError> {
        let envelope = Envelope::signal(
            self.ctx.room.clone(),
            self.ctx.local.clone(),
            Some(self.remote.clone()),
            payload,
        )
        .map_err(|e| NegotiationError::Signaling(e.to_string()))?;

        self.ctx
            .signaling
            .send(envelope)
            .await
            .map_err(|e| NegotiationError::Signaling(e.to_string()))
    }
}
