//! Non-durable in-process backend.
//!
//! All appends go through one locked path; no interleaved partial writes
//! are possible. History is lost when the store is dropped.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use sc_proto::{Envelope, StoredMessage};

use crate::error::TransportError;
use crate::store::MessageStore;
use crate::subscribers::SubscriberRegistry;

#[derive(Default)]
struct MemoryInner {
    next_id: u64,
    records: Vec<StoredMessage>,
}

/// In-memory message store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    registry: SubscriberRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
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
            backend = "memory",
            id = message.id,
            sender = %message.sender,
            recipient = %message.recipient
        );
        self.registry.notify(&message);
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
        Ok(self.registry.wait(identity, timeout).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn envelope(sender: &str, recipient: &str) -> Envelope {
        Envelope {
            sender: sender.into(),
            recipient: recipient.into(),
            cipher_text: "Y3Q=".into(),
            nonce: "aXY=".into(),
        }
    }

    #[tokio::test]
    async fn append_assigns_monotonic_ids() {
        let store = MemoryStore::new();
        let a = store.append(envelope("Alice", "Bob"), None).await.unwrap();
        let b = store.append(envelope("Bob", "Alice"), None).await.unwrap();
        assert!(b.id > a.id);
        assert!(a.timestamp.is_some());
    }

    #[tokio::test]
    async fn list_all_preserves_append_order() {
        let store = MemoryStore::new();
        store.append(envelope("Alice", "Bob"), None).await.unwrap();
        store.append(envelope("Bob", "Alice"), None).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sender, "Alice");
        assert_eq!(all[1].sender, "Bob");
    }

    #[tokio::test]
    async fn subscriber_is_woken_by_matching_append() {
        let store = Arc::new(MemoryStore::new());
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                store.subscribe("Bob", Duration::from_secs(5)).await
            })
        };
        // Let the subscriber register before appending.
        tokio::task::yield_now().await;
        store.append(envelope("Alice", "Bob"), None).await.unwrap();
        let received = waiter.await.unwrap().unwrap().unwrap();
        assert_eq!(received.recipient, "Bob");
    }

    #[tokio::test]
    async fn subscribe_times_out_without_traffic() {
        let store = MemoryStore::new();
        let start = std::time::Instant::now();
        let result = store
            .subscribe("Bob", Duration::from_millis(100))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn concurrent_appends_all_persist() {
        let store = Arc::new(MemoryStore::new());
        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.append(envelope("Alice", "Bob"), None).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.append(envelope("Bob", "Alice"), None).await })
        };
        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_ne!(a.id, b.id);
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
