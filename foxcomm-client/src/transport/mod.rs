mod peer_connection;
mod rtc_connector;
mod signaling_output;
mod ws_signaling;

pub use peer_connection::*;
pub use rtc_connector::*;
pub use signaling_output::*;
pub use ws_signaling::*;
