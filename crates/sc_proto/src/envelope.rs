//! Encrypted message envelope — what the transport sees.
//!
//! The transport is a DUMB STORE: it only sees:
//!   - sender     (needed for self-notification echo)
//!   - recipient  (needed for routing — cannot be avoided)
//!   - cipherText (opaque bytes, base64)
//!   - iv         (the 96-bit AES-GCM nonce, base64)
//!
//! The transport CANNOT see plaintext (outside the explicitly flagged demo
//! mode, see `StoredMessage::plain_text`). An envelope is immutable once
//! created; the nonce is freshly random per envelope and never reused under
//! the same session key.

use serde::{Deserialize, Serialize};

/// On-wire envelope — handed to and received from the delivery transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sending party name.
    pub sender: String,

    /// Receiving party name.
    pub recipient: String,

    /// AES-256-GCM ciphertext (includes the auth tag), base64-encoded.
    pub cipher_text: String,

    /// 12-byte random nonce the body was sealed with, base64-encoded.
    #[serde(rename = "iv")]
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names_match_record_layout() {
        let envelope = Envelope {
            sender: "Alice".into(),
            recipient: "Bob".into(),
            cipher_text: "Y3Q=".into(),
            nonce: "bm9uY2U=".into(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["sender"], "Alice");
        assert_eq!(json["recipient"], "Bob");
        assert!(json.get("cipherText").is_some());
        assert!(json.get("iv").is_some());
        assert!(json.get("nonce").is_none());

        let back: Envelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
    }
}
