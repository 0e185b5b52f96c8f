mod candidate_impl;
mod link_command;
mod link_event;
mod link_types;
mod media_event_impl;
mod negotiate_impl;
mod peer_link;

pub(crate) use link_command::*;
pub(crate) use link_event::*;
pub use link_types::*;
pub(crate) use peer_link::*;
