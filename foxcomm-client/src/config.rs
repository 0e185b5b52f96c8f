use crate::error::ConfigError;
use foxcomm_core::utils::DEFAULT_RELAY_PORT;
use foxcomm_core::{IceServerConfig, PeerId, RoomId};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay address; a bare `host:port` is accepted and treated as `ws://`.
    pub url: String,
    pub room: RoomId,
    pub peer_id: PeerId,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, room: impl Into<RoomId>) -> Self {
        Self {
            url: url.into(),
            room: room.into(),
            ..Self::default()
        }
    }

    /// Validated, scheme-qualified relay url.
    pub fn relay_url(&self) -> Result<String, ConfigError> {
        if self.room.is_empty() {
            return Err(ConfigError::EmptyRoom);
        }
        if self.peer_id.is_empty() {
            return Err(ConfigError::EmptyPeerId);
        }
        normalize_url(&self.url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: format!("ws://127.0.0.1:{}", DEFAULT_RELAY_PORT),
            room: RoomId::from("room1"),
            peer_id: PeerId::generate(),
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}

pub fn normalize_url(input: &str) -> Result<String, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyUrl);
    }
    if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        return Ok(trimmed.to_owned());
    }
    if trimmed.contains("://") {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_owned()));
    }
    Ok(format!("ws://{}", trimmed))
}
