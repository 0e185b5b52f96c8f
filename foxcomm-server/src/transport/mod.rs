mod connection_session;
mod ws_handler;

pub use connection_session::*;
pub use ws_handler::*;
