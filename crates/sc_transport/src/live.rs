//! Push-notification backend.
//!
//! Models a managed document store with a native change feed (the kind of
//! backend where `subscribe` is a live query rather than a poll registry).
//! Every append is published on a broadcast feed; `subscribe` attaches a
//! feed receiver FIRST and then filters for the identity, so no append
//! that happens while the subscription is pending can be missed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use sc_proto::{Envelope, StoredMessage};

use crate::error::TransportError;
use crate::store::MessageStore;

/// Change-feed depth. A slow subscriber that lags more than this many
/// messages skips ahead (and still sees everything via `list_all`).
const FEED_CAPACITY: usize = 256;

#[derive(Default)]
struct LiveInner {
    next_id: u64,
    records: Vec<StoredMessage>,
}

/// Document-store-style backend with native push.
pub struct LiveStore {
    inner: Mutex<LiveInner>,
    feed: broadcast::Sender<StoredMessage>,
}

impl LiveStore {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            inner: Mutex::new(LiveInner::default()),
            feed,
        }
    }
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for LiveStore {
    async fn append(
        &self,
        envelope: Envelope,
        plain_text: Option<String>,
    ) -> Result<StoredMessage, TransportError> {
        let message = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let message = StoredMessage {
                id: inner.next_id,
                sender: envelope.sender,
                recipient: envelope.recipient,
                plain_text,
                cipher_text: envelope.cipher_text,
                nonce: envelope.nonce,
                timestamp: Some(Utc::now()),
            };
            inner.records.push(message.clone());
            message
        };

        tracing::debug!(
            target: "sc_transport",
            event = "append",
            backend = "live",
            id = message.id,
            sender = %message.sender,
            recipient = %message.recipient
        );
        // No receivers is fine — the record is already in the history.
        let _ = self.feed.send(message.clone());
        Ok(message)
    }

    async fn list_all(&self) -> Result<Vec<StoredMessage>, TransportError> {
        Ok(self.inner.lock().records.clone())
    }

    async fn subscribe(
        &self,
        identity: &str,
        timeout: Duration,
    ) -> Result<Option<StoredMessage>, TransportError> {
        let mut rx = self.feed.subscribe();
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Ok(message)) if message.involves(identity) => return Ok(Some(message)),
                Ok(Ok(_)) => continue,
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::warn!(
                        target: "sc_transport",
                        event = "feed_lagged",
                        identity = %identity,
                        skipped
                    );
                    continue;
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => return Ok(None),
                Err(_) => return Ok(None),
            }
        }
    }
}
