use foxcomm_core::utils::DEFAULT_RELAY_PORT;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Relay process settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Per-session queue of encoded envelopes waiting for the socket writer.
    pub outbound_capacity: usize,
    /// Upper bound on a single socket write before the connection is dropped.
    pub send_timeout: Duration,
    pub registry_capacity: usize,
}

impl RelayConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_RELAY_PORT,
            outbound_capacity: 64,
            send_timeout: Duration::from_secs(5),
            registry_capacity: 1024,
        }
    }
}
