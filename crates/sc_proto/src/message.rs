//! Stored message records and the delivery-state vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// A message as persisted by the delivery transport. Never mutated once
/// stored. Matches the record layout
/// `{id, sender, recipient, plainText?, cipherText, iv, timestamp?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Store-assigned identifier, monotonic within one store.
    pub id: u64,

    pub sender: String,

    pub recipient: String,

    /// Present ONLY when the sending client runs with its demo
    /// reveal-plaintext flag enabled. Sensitive if retained; never set in
    /// normal operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,

    /// Base64 AES-256-GCM ciphertext.
    pub cipher_text: String,

    /// Base64 96-bit nonce.
    #[serde(rename = "iv")]
    pub nonce: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl StoredMessage {
    /// The routable encrypted payload, without store metadata.
    pub fn envelope(&self) -> Envelope {
        Envelope {
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            cipher_text: self.cipher_text.clone(),
            nonce: self.nonce.clone(),
        }
    }

    /// Whether `identity` is a party to this message (sender or recipient).
    pub fn involves(&self, identity: &str) -> bool {
        self.sender == identity || self.recipient == identity
    }
}

/// Client-local, transient per-message lifecycle state. Not persisted.
///
/// Sender path: `Idle → Encrypting → Sending → Sent → Delivered` (the last
/// step only if the transport echoes the message back). Recipient path:
/// `Decrypting → Complete` or `Decrypting → Failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    #[default]
    Idle,
    Encrypting,
    Sending,
    Sent,
    Delivered,
    Decrypting,
    Complete,
    Failed,
}

impl DeliveryState {
    /// Terminal states: `Sent`/`Delivered` for the sender, `Complete`/
    /// `Failed` for the recipient.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeliveryState::Sent
                | DeliveryState::Delivered
                | DeliveryState::Complete
                | DeliveryState::Failed
        )
    }
}
