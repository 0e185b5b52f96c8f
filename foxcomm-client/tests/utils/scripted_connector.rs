use anyhow::{Result, bail};
use async_trait::async_trait;
use foxcomm_client::{MediaEvent, MediaState, PeerConnection, PeerConnector};
use foxcomm_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Peer connection stand-in with deterministic behavior:
///
/// - `add_ice_candidate` fails until a remote description is set
/// - `set_local_description` emits two local candidates
/// - it reports `Connected` once both descriptions and at least one remote
///   candidate are in place
///
/// Every connection has its own ICE username fragment (`<label>-<n>`), carried
/// both in its SDP and in its candidates.
pub struct ScriptedConnection {
    label: String,
    ufrag: String,
    script: Script,
    events: mpsc::Sender<MediaEvent>,
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    local: Option<SessionDescription>,
    remote: Option<SessionDescription>,
    remote_candidates: Vec<IceCandidate>,
    rejected_candidates: usize,
    connected: bool,
    closed: bool,
}

/// Failure and latency knobs shared by all connections of one connector.
#[derive(Clone, Copy, Default)]
struct Script {
    reject_remote_description: bool,
    reject_first_candidate: bool,
    close_delay: Option<Duration>,
}

impl ScriptedConnection {
    pub fn ufrag(&self) -> &str {
        &self.ufrag
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn remote_candidates(&self) -> Vec<IceCandidate> {
        self.state.lock().unwrap().remote_candidates.clone()
    }

    /// Push a media event as if the underlying stack raised it.
    pub fn raise(&self, event: MediaEvent) {
        let _ = self.events.try_send(event);
    }

    fn sdp(&self, kind: &str) -> String {
        format!(
            "v=0\r\ns={}-from-{}\r\na=ice-ufrag:{}\r\n",
            kind, self.label, self.ufrag
        )
    }

    fn maybe_connect(&self, state: &mut ScriptState) {
        if state.connected || state.closed {
            return;
        }
        if state.local.is_some() && state.remote.is_some() && !state.remote_candidates.is_empty() {
            state.connected = true;
            let _ = self
                .events
                .try_send(MediaEvent::StateChanged(MediaState::Connected));
        }
    }
}

#[async_trait]
impl PeerConnection for ScriptedConnection {
    async fn create_offer(&self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer(self.sdp("offer")))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let state = self.state.lock().unwrap();
        match &state.remote {
            Some(remote) if remote.kind == SdpKind::Offer => {
                Ok(SessionDescription::answer(self.sdp("answer")))
            }
            _ => bail!("no remote offer to answer"),
        }
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.local = Some(desc);
        for n in 1..=2 {
            let _ = self.events.try_send(MediaEvent::LocalCandidate(IceCandidate {
                candidate: format!("candidate:{} 1 udp 2122260223 10.0.0.{} 5000{} typ host", n, n, n),
                sdp_mid: Some("0".into()),
                sdp_m_line_index: Some(0),
                username_fragment: Some(self.ufrag.clone()),
            }));
        }
        self.maybe_connect(&mut state);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        if self.script.reject_remote_description {
            bail!("malformed session description");
        }
        let mut state = self.state.lock().unwrap();
        state.remote = Some(desc);
        self.maybe_connect(&mut state);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.remote.is_none() {
            bail!("remote description is not set");
        }
        if self.script.reject_first_candidate && state.rejected_candidates == 0 {
            state.rejected_candidates += 1;
            bail!("unparseable candidate {}", candidate.candidate);
        }
        state.remote_candidates.push(candidate);
        self.maybe_connect(&mut state);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Some(delay) = self.script.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out [`ScriptedConnection`]s and keeps every one it made.
#[derive(Clone)]
pub struct ScriptedConnector {
    label: String,
    script: Script,
    made: Arc<Mutex<Vec<Arc<ScriptedConnection>>>>,
}

impl ScriptedConnector {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            script: Script::default(),
            made: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Connections from this connector refuse every remote description.
    pub fn rejecting_remote_descriptions(label: &str) -> Self {
        let mut connector = Self::new(label);
        connector.script.reject_remote_description = true;
        connector
    }

    /// Each connection refuses the first remote candidate it is given.
    pub fn rejecting_first_candidate(label: &str) -> Self {
        let mut connector = Self::new(label);
        connector.script.reject_first_candidate = true;
        connector
    }

    /// Closing a connection takes `delay`.
    pub fn with_close_delay(label: &str, delay: Duration) -> Self {
        let mut connector = Self::new(label);
        connector.script.close_delay = Some(delay);
        connector
    }

    pub fn connection_count(&self) -> usize {
        self.made.lock().unwrap().len()
    }

    pub fn last_connection(&self) -> Option<Arc<ScriptedConnection>> {
        self.made.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PeerConnector for ScriptedConnector {
    async fn connect(&self, events: mpsc::Sender<MediaEvent>) -> Result<Arc<dyn PeerConnection>> {
        let mut made = self.made.lock().unwrap();
        let connection = Arc::new(ScriptedConnection {
            label: self.label.clone(),
            ufrag: format!("{}-{}", self.label, made.len() + 1),
            script: self.script,
            events,
            state: Mutex::new(ScriptState::default()),
        });
        made.push(connection.clone());
        Ok(connection)
    }
}
