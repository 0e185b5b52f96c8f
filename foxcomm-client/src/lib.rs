mod client;
mod config;
mod error;
mod negotiator;
mod transport;

pub use client::*;
pub use config::*;
pub use error::*;
pub use negotiator::*;
pub use transport::*;
