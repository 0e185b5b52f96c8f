mod client_event;
mod handle_envelope_impl;
mod handle_link_event_impl;
mod link;
mod negotiator;
mod negotiator_command;
mod negotiator_handle;

pub use client_event::*;
pub use link::{LinkId, LinkState, Role};
pub use negotiator::*;
pub(crate) use negotiator_command::*;
pub use negotiator_handle::*;
