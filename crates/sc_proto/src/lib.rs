//! sc_proto — Wire types, envelopes, and the message codec for Sealchat
//!
//! All on-wire and persisted types serialise to JSON with camelCase field
//! names, matching the record layout the transport stores
//! (`{id, sender, recipient, plainText?, cipherText, iv, timestamp?}`).
//!
//! # Modules
//! - `envelope` — Encrypted message envelope (what the transport sees)
//! - `message`  — Stored message records + delivery state vocabulary
//! - `codec`    — Encrypt/decrypt message bodies under a session key

pub mod codec;
pub mod envelope;
pub mod message;

pub use codec::{CodecError, MAX_PLAINTEXT_BYTES};
pub use envelope::Envelope;
pub use message::{DeliveryState, StoredMessage};
