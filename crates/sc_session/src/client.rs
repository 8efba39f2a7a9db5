//! Chat client: drives messages through encrypt → append → notify →
//! decrypt against a pluggable delivery transport.
//!
//! Each client owns one [`Party`] and a local message view. The view is
//! client-local derived state: plaintext never leaves the client except in
//! the explicitly flagged demo reveal mode. Within one client, sends are
//! processed in call order; ordering across clients is whatever the
//! transport's append sequence provides.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use sc_crypto::SessionKey;
use sc_proto::{codec, DeliveryState, StoredMessage};
use sc_transport::MessageStore;

use crate::error::SessionError;
use crate::exchange;
use crate::lifecycle::{Lifecycle, LifecycleEvent, StatusIndicator, STATUS_CLEAR_DELAY};
use crate::oplog::OperationLog;
use crate::party::Party;

/// Backoff before re-subscribing after a transport error in the inbox
/// path. Transient hiccups must not permanently stop delivery.
const SUBSCRIBE_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Sentinel id for an optimistic local echo that the transport has not
/// confirmed yet.
const PENDING_ID: u64 = 0;

/// A message as this client sees it. `display_text` is the decrypted body,
/// the sender's original text, or a placeholder — never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMessage {
    pub id: u64,
    pub sender: String,
    pub recipient: String,
    pub display_text: String,
    pub cipher_text: String,
    pub state: DeliveryState,
    pub timestamp: Option<DateTime<Utc>>,
}

pub struct ChatClient {
    name: String,
    party: Mutex<Party>,
    store: Arc<dyn MessageStore>,
    log: Arc<OperationLog>,
    view: Mutex<Vec<LocalMessage>>,
    status: StatusIndicator,
    reveal_plaintext: bool,
}

impl ChatClient {
    pub fn new(name: impl Into<String>, store: Arc<dyn MessageStore>, log: Arc<OperationLog>) -> Self {
        let name = name.into();
        Self {
            party: Mutex::new(Party::new(name.clone())),
            name,
            store,
            log,
            view: Mutex::new(Vec::new()),
            status: StatusIndicator::new(),
            reveal_plaintext: false,
        }
    }

    /// Demo-only: also hand the plaintext to the transport so stored
    /// records carry a `plainText` field. Never enable outside
    /// demonstrations — the stored plaintext defeats the encryption.
    pub fn with_reveal_plaintext(mut self, reveal: bool) -> Self {
        self.reveal_plaintext = reveal;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub fn operation_log(&self) -> &OperationLog {
        &self.log
    }

    pub fn generate_keys(&self) -> Result<(), SessionError> {
        self.party.lock().generate_keys(&self.log)
    }

    pub fn has_session_key(&self) -> bool {
        self.party.lock().has_session_key()
    }

    /// Run the hybrid key exchange with `responder`, installing the shared
    /// session key on both clients.
    pub fn establish_session_with(&self, responder: &ChatClient) -> Result<String, SessionError> {
        // Deterministic lock order so two racing exchanges cannot deadlock.
        let (mut me, mut peer) = if self.name <= responder.name {
            let me = self.party.lock();
            let peer = responder.party.lock();
            (me, peer)
        } else {
            let peer = responder.party.lock();
            let me = self.party.lock();
            (me, peer)
        };
        exchange::establish_session(&mut me, &mut peer, &self.log)
    }

    fn session_key(&self) -> Option<SessionKey> {
        self.party.lock().session_key().cloned()
    }

    /// The local message view, in the order messages were observed.
    pub fn messages(&self) -> Vec<LocalMessage> {
        self.view.lock().clone()
    }

    // ── Send path ────────────────────────────────────────────────────────────

    /// Encrypt `plain_text` and hand it to the transport. The message is
    /// echoed into the local view optimistically; a failed append rolls
    /// the echo back and surfaces `DeliveryFailed`.
    pub async fn send(&self, recipient: &str, plain_text: &str) -> Result<StoredMessage, SessionError> {
        let key = self.session_key().ok_or(SessionError::SessionNotEstablished)?;

        let mut lifecycle = Lifecycle::new();
        self.status.set(lifecycle.apply(LifecycleEvent::SendRequested)?);
        self.log.record(format!(
            "{} is encrypting a message with the session key...",
            self.name
        ));

        let envelope = codec::encrypt_message(&key, &self.name, recipient, plain_text)?;
        let prefix: String = envelope.cipher_text.chars().take(20).collect();
        self.log.record(format!("Message encrypted. Ciphertext: {prefix}..."));

        self.status.set(lifecycle.apply(LifecycleEvent::EnvelopeReady)?);

        // Optimistic local echo, rolled back if the append fails.
        self.view.lock().push(LocalMessage {
            id: PENDING_ID,
            sender: self.name.clone(),
            recipient: recipient.to_string(),
            display_text: plain_text.to_string(),
            cipher_text: envelope.cipher_text.clone(),
            state: DeliveryState::Sending,
            timestamp: Some(Utc::now()),
        });

        let plain_for_store = self.reveal_plaintext.then(|| plain_text.to_string());
        match self.store.append(envelope, plain_for_store).await {
            Ok(stored) => {
                let state = lifecycle.apply(LifecycleEvent::AppendConfirmed)?;
                {
                    let mut view = self.view.lock();
                    if let Some(entry) = view
                        .iter_mut()
                        .find(|m| m.id == PENDING_ID && m.cipher_text == stored.cipher_text)
                    {
                        entry.id = stored.id;
                        entry.state = state;
                        entry.timestamp = stored.timestamp;
                    }
                }
                self.status.set(state);
                self.status.clear_after(STATUS_CLEAR_DELAY);
                self.log.record("Encrypted message sent to the transport.");
                Ok(stored)
            }
            Err(err) => {
                self.view
                    .lock()
                    .retain(|m| !(m.id == PENDING_ID && m.sender == self.name));
                self.status.clear();
                self.log
                    .record(format!("Send failed, rolling back local echo: {err}"));
                Err(err.into())
            }
        }
    }

    // ── Receive path ─────────────────────────────────────────────────────────

    /// Rebuild the local view from the transport's full history. Called
    /// once when a client becomes active, before entering the subscribe
    /// loop.
    pub async fn hydrate(&self) -> Result<(), SessionError> {
        let history = self.store.list_all().await?;
        self.view.lock().clear();
        for stored in &history {
            if stored.involves(&self.name) {
                self.ingest(stored)?;
            }
        }
        Ok(())
    }

    /// One long-poll cycle: wait for the next message involving this
    /// identity, process it, and return the resulting view entry. Resolves
    /// `None` on timeout (a normal outcome). Transport errors are retried
    /// with a short backoff until the timeout elapses; the gap
    /// between resolutions is a bounded missed-message window covered by
    /// [`ChatClient::hydrate`].
    pub async fn poll_once(&self, timeout: Duration) -> Result<Option<LocalMessage>, SessionError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match self.store.subscribe(&self.name, remaining).await {
                Ok(Some(stored)) => return Ok(Some(self.ingest(&stored)?)),
                Ok(None) => return Ok(None),
                Err(err) => {
                    tracing::warn!(
                        target: "sc_session",
                        event = "subscribe_retry",
                        identity = %self.name,
                        error = %err
                    );
                    tokio::time::sleep(SUBSCRIBE_RETRY_BACKOFF).await;
                }
            }
        }
    }

    /// Fold one stored message into the local view.
    fn ingest(&self, stored: &StoredMessage) -> Result<LocalMessage, SessionError> {
        // Sender-side echo: the transport reported our own message back.
        if stored.sender == self.name {
            let mut view = self.view.lock();
            if let Some(entry) = view.iter_mut().find(|m| {
                m.id == stored.id || (m.id == PENDING_ID && m.cipher_text == stored.cipher_text)
            }) {
                entry.id = stored.id;
                if entry.state == DeliveryState::Sent {
                    let mut lifecycle = Lifecycle::resume(entry.state);
                    entry.state = lifecycle.apply(LifecycleEvent::EchoObserved)?;
                    self.status.set(entry.state);
                    self.status.clear_after(STATUS_CLEAR_DELAY);
                }
                return Ok(entry.clone());
            }
            drop(view);
            // Hydration of our own past message: same session key decrypts
            // both directions.
            return self.ingest_foreign(stored, DeliveryState::Sent);
        }

        // Already observed (e.g. hydrate raced a subscription).
        if let Some(existing) = self.view.lock().iter().find(|m| m.id == stored.id) {
            return Ok(existing.clone());
        }

        self.ingest_incoming(stored)
    }

    fn ingest_incoming(&self, stored: &StoredMessage) -> Result<LocalMessage, SessionError> {
        let Some(key) = self.session_key() else {
            self.log.record(format!(
                "[{}] Message {} is encrypted for {}; no session key available.",
                self.name, stored.id, stored.recipient
            ));
            return Ok(self.push_entry(
                stored,
                format!("[encrypted for {}]", stored.recipient),
                DeliveryState::Idle,
            ));
        };

        let mut lifecycle = Lifecycle::new();
        self.status.set(lifecycle.apply(LifecycleEvent::Received)?);

        let (display_text, state) = match codec::decrypt_message(&key, &stored.envelope()) {
            Ok(text) => {
                self.log
                    .record(format!("[{}] Decrypted message {}.", self.name, stored.id));
                (text, lifecycle.apply(LifecycleEvent::DecryptSucceeded)?)
            }
            Err(err) => {
                // Any integrity failure surfaces as a placeholder, never as
                // an aborted message list.
                self.log.record(format!(
                    "[{}] Decryption failed for message {}: {err}",
                    self.name, stored.id
                ));
                (
                    "[decryption failed]".to_string(),
                    lifecycle.apply(LifecycleEvent::DecryptFailed)?,
                )
            }
        };

        self.status.set(state);
        self.status.clear_after(STATUS_CLEAR_DELAY);
        Ok(self.push_entry(stored, display_text, state))
    }

    /// Hydrate a message we sent ourselves (or cannot attribute a pending
    /// echo to): decrypt if possible, placeholder otherwise.
    fn ingest_foreign(
        &self,
        stored: &StoredMessage,
        decrypted_state: DeliveryState,
    ) -> Result<LocalMessage, SessionError> {
        let entry = match self.session_key() {
            Some(key) => match codec::decrypt_message(&key, &stored.envelope()) {
                Ok(text) => self.push_entry(stored, text, decrypted_state),
                Err(_) => {
                    self.push_entry(stored, "[decryption failed]".into(), DeliveryState::Failed)
                }
            },
            None => self.push_entry(
                stored,
                format!("[encrypted for {}]", stored.recipient),
                DeliveryState::Idle,
            ),
        };
        Ok(entry)
    }

    fn push_entry(
        &self,
        stored: &StoredMessage,
        display_text: String,
        state: DeliveryState,
    ) -> LocalMessage {
        let entry = LocalMessage {
            id: stored.id,
            sender: stored.sender.clone(),
            recipient: stored.recipient.clone(),
            display_text,
            cipher_text: stored.cipher_text.clone(),
            state,
            timestamp: stored.timestamp,
        };
        self.view.lock().push(entry.clone());
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sc_proto::Envelope;
    use sc_transport::{MemoryStore, TransportError};

    fn memory_pair() -> (Arc<MemoryStore>, Arc<OperationLog>) {
        (Arc::new(MemoryStore::new()), Arc::new(OperationLog::new()))
    }

    async fn established_clients(
        store: Arc<dyn MessageStore>,
        log: Arc<OperationLog>,
    ) -> (ChatClient, ChatClient) {
        let alice = ChatClient::new("Alice", store.clone(), log.clone());
        let bob = ChatClient::new("Bob", store, log);
        alice.generate_keys().unwrap();
        bob.generate_keys().unwrap();
        alice.establish_session_with(&bob).unwrap();
        (alice, bob)
    }

    #[tokio::test]
    async fn send_requires_a_session_key() {
        let (store, log) = memory_pair();
        let alice = ChatClient::new("Alice", store, log);
        alice.generate_keys().unwrap();
        let err = alice.send("Bob", "hello").await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotEstablished));
        assert!(alice.messages().is_empty());
    }

    #[tokio::test]
    async fn hello_reaches_bob_decrypted() {
        let (store, log) = memory_pair();
        let (alice, bob) = established_clients(store, log).await;

        let poll = {
            let handle = tokio::spawn(async move {
                let received = bob.poll_once(Duration::from_secs(5)).await;
                (bob, received)
            });
            tokio::task::yield_now().await;
            handle
        };

        let stored = alice.send("Bob", "hello").await.unwrap();
        assert!(stored.plain_text.is_none());

        let (bob, received) = poll.await.unwrap();
        let received = received.unwrap().unwrap();
        assert_eq!(received.display_text, "hello");
        assert_eq!(received.state, DeliveryState::Complete);
        assert_eq!(bob.messages().len(), 1);

        // Sender side reached its terminal state.
        let alice_view = alice.messages();
        assert_eq!(alice_view.len(), 1);
        assert_eq!(alice_view[0].id, stored.id);
        assert_eq!(alice_view[0].state, DeliveryState::Sent);
    }

    #[tokio::test]
    async fn transport_echo_advances_sender_to_delivered() {
        let (store, log) = memory_pair();
        let (alice, _bob) = established_clients(store, log).await;

        let alice = Arc::new(alice);
        let poll = {
            let alice = alice.clone();
            let handle =
                tokio::spawn(async move { alice.poll_once(Duration::from_secs(5)).await });
            tokio::task::yield_now().await;
            handle
        };

        alice.send("Bob", "echo me").await.unwrap();
        let echoed = poll.await.unwrap().unwrap().unwrap();
        assert_eq!(echoed.state, DeliveryState::Delivered);
        assert_eq!(alice.messages()[0].state, DeliveryState::Delivered);
    }

    #[tokio::test]
    async fn recipient_without_session_key_sees_placeholder() {
        let (store, log) = memory_pair();

        // A message for Bob arrives before Bob has any session key.
        let stray_key = SessionKey::generate();
        let envelope = codec::encrypt_message(&stray_key, "Mallory", "Bob", "you cannot read this")
            .unwrap();
        store.append(envelope, None).await.unwrap();

        let bob = ChatClient::new("Bob", store, log);
        bob.hydrate().await.unwrap();

        let view = bob.messages();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].display_text, "[encrypted for Bob]");
        assert_ne!(view[0].display_text, "you cannot read this");
        assert!(!view[0].state.is_terminal());
    }

    #[tokio::test]
    async fn wrong_key_shows_decryption_failed_placeholder() {
        let (store, log) = memory_pair();
        let (_alice, bob) = established_clients(store.clone(), log).await;

        // Encrypted under a key Bob does not hold.
        let foreign = SessionKey::generate();
        let envelope = codec::encrypt_message(&foreign, "Mallory", "Bob", "garbled").unwrap();

        let bob = Arc::new(bob);
        let poll = {
            let bob = bob.clone();
            let handle = tokio::spawn(async move { bob.poll_once(Duration::from_secs(5)).await });
            tokio::task::yield_now().await;
            handle
        };
        store.append(envelope, None).await.unwrap();

        let received = poll.await.unwrap().unwrap().unwrap();
        assert_eq!(received.display_text, "[decryption failed]");
        assert_eq!(received.state, DeliveryState::Failed);
    }

    struct FailingStore;

    #[async_trait]
    impl MessageStore for FailingStore {
        async fn append(
            &self,
            _envelope: Envelope,
            _plain_text: Option<String>,
        ) -> Result<StoredMessage, TransportError> {
            Err(TransportError::DeliveryFailed {
                reason: "backend offline".into(),
            })
        }

        async fn list_all(&self) -> Result<Vec<StoredMessage>, TransportError> {
            Ok(Vec::new())
        }

        async fn subscribe(
            &self,
            _identity: &str,
            _timeout: Duration,
        ) -> Result<Option<StoredMessage>, TransportError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn failed_append_rolls_back_optimistic_echo() {
        let log = Arc::new(OperationLog::new());
        let (alice, _bob) = established_clients(Arc::new(FailingStore), log).await;

        let err = alice.send("Bob", "will not arrive").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Delivery(TransportError::DeliveryFailed { .. })
        ));
        assert!(alice.messages().is_empty());
        assert_eq!(alice.status().current(), None);
    }

    #[tokio::test]
    async fn hydrate_rebuilds_both_directions() {
        let (store, log) = memory_pair();
        let (alice, bob) = established_clients(store.clone(), log.clone()).await;

        alice.send("Bob", "first").await.unwrap();
        bob.send("Alice", "second").await.unwrap();

        // A freshly hydrated view decrypts the whole history.
        bob.hydrate().await.unwrap();
        let view = bob.messages();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].display_text, "first");
        assert_eq!(view[0].state, DeliveryState::Complete);
        assert_eq!(view[1].display_text, "second");
        assert_eq!(view[1].state, DeliveryState::Sent);
    }

    #[tokio::test]
    async fn reveal_plaintext_is_opt_in() {
        let (store, log) = memory_pair();
        let alice = ChatClient::new("Alice", store.clone(), log.clone())
            .with_reveal_plaintext(true);
        let bob = ChatClient::new("Bob", store.clone(), log);
        alice.generate_keys().unwrap();
        bob.generate_keys().unwrap();
        alice.establish_session_with(&bob).unwrap();

        let stored = alice.send("Bob", "demo mode").await.unwrap();
        assert_eq!(stored.plain_text.as_deref(), Some("demo mode"));
    }
}
