use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// An append could not be persisted. The caller's optimistic local
    /// state must be rolled back; retry policy is the caller's concern.
    #[error("Delivery failed: {reason}")]
    DeliveryFailed { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
