pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Port the relay listens on when nothing else is configured.
pub const DEFAULT_RELAY_PORT: u16 = 3000;
