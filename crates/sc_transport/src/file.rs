//! Durable flat-file backend.
//!
//! The whole history lives in one JSON array, mirroring the persisted
//! record layout (`plainText` only ever present in demo mode). A
//! read-through cache is loaded once at open; reads never touch the disk
//! afterwards. Appends rewrite the file through a temp-file rename so a
//! crash mid-write cannot truncate existing history, and the cache only
//! admits a record once the rewrite succeeded — a failed append is
//! reported as `DeliveryFailed` and leaves no trace.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use sc_proto::{Envelope, StoredMessage};

use crate::error::TransportError;
use crate::store::MessageStore;
use crate::subscribers::SubscriberRegistry;

struct FileState {
    next_id: u64,
    cache: Vec<StoredMessage>,
}

/// Flat-file message store with a read-through cache.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<FileState>,
    registry: SubscriberRegistry,
}

impl FileStore {
    /// Open (or create) the JSON history at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let path = path.into();
        let cache: Vec<StoredMessage> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        let next_id = cache.iter().map(|m| m.id).max().unwrap_or(0);

        tracing::debug!(
            target: "sc_transport",
            event = "file_store_open",
            path = %path.display(),
            records = cache.len()
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState { next_id, cache }),
            registry: SubscriberRegistry::new(),
        })
    }

    async fn persist(path: &Path, records: &[StoredMessage]) -> Result<(), TransportError> {
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(records)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for FileStore {
    async fn append(
        &self,
        envelope: Envelope,
        plain_text: Option<String>,
    ) -> Result<StoredMessage, TransportError> {
        // The state lock serialises appends end-to-end: id assignment,
        // rewrite, and cache admission happen with no interleaving.
        let mut state = self.state.lock().await;
        let message = StoredMessage {
            id: state.next_id + 1,
            sender: envelope.sender,
            recipient: envelope.recipient,
            plain_text,
            cipher_text: envelope.cipher_text,
            nonce: envelope.nonce,
            timestamp: Some(Utc::now()),
        };

        let mut records = state.cache.clone();
        records.push(message.clone());
        Self::persist(&self.path, &records)
            .await
            .map_err(|err| TransportError::DeliveryFailed {
                reason: err.to_string(),
            })?;

        state.next_id = message.id;
        state.cache = records;
        drop(state);

        tracing::debug!(
            target: "sc_transport",
            event = "append",
            backend = "file",
            id = message.id,
            sender = %message.sender,
            recipient = %message.recipient
        );
        self.registry.notify(&message);
        Ok(message)
    }

    async fn list_all(&self) -> Result<Vec<StoredMessage>, TransportError> {
        Ok(self.state.lock().await.cache.clone())
    }

    async fn subscribe(
        &self,
        identity: &str,
        timeout: Duration,
    ) -> Result<Option<StoredMessage>, TransportError> {
        Ok(self.registry.wait(identity, timeout).await)
    }
}
