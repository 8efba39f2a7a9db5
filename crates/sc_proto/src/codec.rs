//! Message envelope codec — seals plaintext into transportable envelopes
//! under the session key, and opens them again.
//!
//! The codec never attempts best-effort partial decryption: an integrity
//! failure surfaces verbatim to the caller, which substitutes a placeholder
//! rather than crashing the message list.

use sc_crypto::{aead, CryptoError, SessionKey};

use crate::envelope::Envelope;

/// Upper bound on message plaintext size. Larger bodies fail with
/// [`CodecError::NotEncryptable`] before touching the cipher.
pub const MAX_PLAINTEXT_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Message not encryptable: {size} bytes exceeds the {max}-byte limit")]
    NotEncryptable { size: usize, max: usize },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl CodecError {
    /// True when this is an authentication/integrity failure (as opposed to
    /// a size or key-format problem). Callers branch to the
    /// "decryption failed" placeholder on this.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, CodecError::Crypto(CryptoError::DecryptionFailed))
    }
}

/// Encrypt `plain_text` under the session key into an envelope addressed
/// from `sender` to `recipient`. The nonce is freshly random per call.
pub fn encrypt_message(
    key: &SessionKey,
    sender: &str,
    recipient: &str,
    plain_text: &str,
) -> Result<Envelope, CodecError> {
    if plain_text.len() > MAX_PLAINTEXT_BYTES {
        return Err(CodecError::NotEncryptable {
            size: plain_text.len(),
            max: MAX_PLAINTEXT_BYTES,
        });
    }

    let sealed = aead::encrypt(key, plain_text)?;
    Ok(Envelope {
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        cipher_text: sealed.ciphertext,
        nonce: sealed.nonce,
    })
}

/// Decrypt an envelope's body under the session key.
pub fn decrypt_message(key: &SessionKey, envelope: &Envelope) -> Result<String, CodecError> {
    Ok(aead::decrypt(key, &envelope.cipher_text, &envelope.nonce)?)
}
