use super::{MAX_PENDING_CANDIDATES, PeerLink};
use crate::error::NegotiationError;
use foxcomm_core::{IceCandidate, SignalPayload};
use tracing::{debug, warn};

impl PeerLink {
    /// Apply a remote candidate, or hold it until a remote description is in
    /// place. Description and candidate envelopes may arrive in any order.
    pub(super) async fn add_remote_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        if self.ignored_ufrag.is_some()
            && candidate_ufrag(&candidate) == self.ignored_ufrag.as_deref()
        {
            debug!("Dropping candidate from {} for an offer we ignored", self.remote);
            return Ok(());
        }

        if self.remote_description_applied {
            if let Some(connection) = self.connection.clone() {
                return connection
                    .add_ice_candidate(candidate)
                    .await
                    .map_err(|e| NegotiationError::Candidate(e.to_string()));
            }
        }

        if self.pending_remote_candidates.len() >= MAX_PENDING_CANDIDATES {
            warn!("Too many early candidates from {}, dropping the oldest", self.remote);
            self.pending_remote_candidates.pop_front();
        }
        debug!("Holding candidate from {} until remote description", self.remote);
        self.pending_remote_candidates.push_back(candidate);
        Ok(())
    }

    /// Apply held candidates. A rejected one is reported and skipped.
    pub(super) async fn flush_remote_candidates(&mut self) {
        let Some(connection) = self.connection.clone() else {
            return;
        };

        while let Some(candidate) = self.pending_remote_candidates.pop_front() {
            if let Err(e) = connection.add_ice_candidate(candidate).await {
                self.report_failure(NegotiationError::Candidate(e.to_string()));
            }
        }
    }

    pub(super) async fn on_local_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        if !self.local_description_sent {
            self.pending_local_candidates.push(candidate);
            return Ok(());
        }
        self.send_payload(&SignalPayload::Candidate { candidate })
            .await
    }
}

/// ICE username fragment named by a session description.
pub(super) fn description_ufrag(sdp: &str) -> Option<&str> {
    sdp.lines()
        .find_map(|line| line.trim().strip_prefix("a=ice-ufrag:"))
        .map(str::trim)
        .filter(|ufrag| !ufrag.is_empty())
}

/// ICE username fragment a candidate belongs to: the explicit field, else the
/// `ufrag` attribute of the candidate line.
pub(super) fn candidate_ufrag(candidate: &IceCandidate) -> Option<&str> {
    if let Some(ufrag) = candidate.username_fragment.as_deref() {
        return Some(ufrag);
    }
    let mut parts = candidate.candidate.split_whitespace();
    while let Some(part) = parts.next() {
        if part == "ufrag" {
            return parts.next();
        }
    }
    None
}
