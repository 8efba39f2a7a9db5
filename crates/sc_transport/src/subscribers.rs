//! Per-identity subscription registry.
//!
//! Owned by the store instance, never process-global, so multiple
//! independent chat sessions run without cross-talk. Each registered waiter
//! is single-shot: it resolves with the first matching message and is then
//! removed. There is no fixed ceiling on waiter count.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use sc_proto::StoredMessage;

struct Waiter {
    identity: String,
    tx: oneshot::Sender<StoredMessage>,
}

#[derive(Default)]
pub struct SubscriberRegistry {
    waiters: Mutex<Vec<Waiter>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-shot waiter for `identity`.
    pub fn register(&self, identity: &str) -> oneshot::Receiver<StoredMessage> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().push(Waiter {
            identity: identity.to_string(),
            tx,
        });
        rx
    }

    /// Resolve every pending waiter whose identity is a party to `message`
    /// (fan-out to all matching listeners). Waiters whose receiver was
    /// dropped (timed out) are purged here.
    pub fn notify(&self, message: &StoredMessage) {
        let mut guard = self.waiters.lock();
        let waiters = std::mem::take(&mut *guard);
        for waiter in waiters {
            if waiter.tx.is_closed() {
                continue;
            }
            if message.involves(&waiter.identity) {
                let _ = waiter.tx.send(message.clone());
            } else {
                guard.push(waiter);
            }
        }
    }

    /// Long-poll helper: register, then wait for a match or the timeout,
    /// whichever happens first.
    pub async fn wait(&self, identity: &str, timeout: Duration) -> Option<StoredMessage> {
        let rx = self.register(identity);
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(message)) => Some(message),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.waiters.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: u64, sender: &str, recipient: &str) -> StoredMessage {
        StoredMessage {
            id,
            sender: sender.into(),
            recipient: recipient.into(),
            plain_text: None,
            cipher_text: "Y3Q=".into(),
            nonce: "aXY=".into(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn waiter_resolves_on_matching_message() {
        let registry = SubscriberRegistry::new();
        let rx = registry.register("Bob");
        registry.notify(&stored(1, "Alice", "Bob"));
        assert_eq!(rx.await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn sender_side_echo_also_matches() {
        let registry = SubscriberRegistry::new();
        let rx = registry.register("Alice");
        registry.notify(&stored(2, "Alice", "Bob"));
        assert_eq!(rx.await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn unrelated_identity_keeps_waiting() {
        let registry = SubscriberRegistry::new();
        let _rx = registry.register("Carol");
        registry.notify(&stored(3, "Alice", "Bob"));
        assert_eq!(registry.pending(), 1);
    }

    #[tokio::test]
    async fn dropped_receivers_are_purged() {
        let registry = SubscriberRegistry::new();
        drop(registry.register("Bob"));
        registry.notify(&stored(4, "Alice", "Bob"));
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test]
    async fn wait_times_out_with_none() {
        let registry = SubscriberRegistry::new();
        let start = tokio::time::Instant::now();
        let result = registry.wait("Bob", Duration::from_millis(100)).await;
        assert!(result.is_none());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
