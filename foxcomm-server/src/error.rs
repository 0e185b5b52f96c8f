use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The registry actor has stopped; nothing more can be routed.
    #[error("room registry is no longer running")]
    RegistryUnavailable,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("outbound queue is full")]
    QueueFull,
    #[error("transport is closed")]
    Closed,
}
