//! The backend capability interface.

use std::time::Duration;

use async_trait::async_trait;

use sc_proto::{Envelope, StoredMessage};

use crate::error::TransportError;

/// Default long-poll timeout for [`MessageStore::subscribe`].
pub const DEFAULT_SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Append/query/notify contract every delivery backend satisfies.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist an envelope, assigning a unique monotonic id. Atomic: safe
    /// to call concurrently from multiple senders without losing or
    /// duplicating entries. `plain_text` is stored only when the sending
    /// client runs in demo reveal mode.
    async fn append(
        &self,
        envelope: Envelope,
        plain_text: Option<String>,
    ) -> Result<StoredMessage, TransportError>;

    /// The full history, ordered by append sequence.
    async fn list_all(&self) -> Result<Vec<StoredMessage>, TransportError>;

    /// Single-shot long-poll: resolves with the next appended message whose
    /// sender or recipient equals `identity`, or `None` once `timeout`
    /// elapses — a normal outcome, not an error. Not restartable; callers
    /// re-invoke to keep listening. There is no cancel primitive: the
    /// timeout is the only bound on a pending subscription.
    async fn subscribe(
        &self,
        identity: &str,
        timeout: Duration,
    ) -> Result<Option<StoredMessage>, TransportError>;
}
