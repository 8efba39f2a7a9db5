//! Authenticated symmetric encryption for message bodies.
//!
//! AES-256-GCM. Key size: 32 bytes. Nonce: 12 bytes (random, fresh per
//! call). Tag: 16 bytes, appended to the ciphertext by the cipher.
//!
//! Ciphertext and nonce travel separately, each standard-base64 encoded —
//! the persisted record layout keeps them as distinct fields rather than
//! concatenating them.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Symmetric key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

// ── Session key ──────────────────────────────────────────────────────────────

/// A 256-bit symmetric session key. Two parties holding imports of the same
/// raw bytes decrypt each other's ciphertexts interchangeably. Zeroized on
/// drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Import a key from its raw byte representation.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::KeyFormat(format!(
                "Session key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Export the raw key bytes. `SessionKey::from_raw(key.raw())` is the
    /// identity on valid keys.
    pub fn raw(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key bytes.
        f.write_str("SessionKey(..)")
    }
}

// ── Encrypt / decrypt ────────────────────────────────────────────────────────

/// Output of [`encrypt`]: base64 ciphertext plus the base64 nonce it was
/// sealed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedText {
    pub ciphertext: String,
    pub nonce: String,
}

/// Encrypt `plaintext` under `key` with a fresh random 96-bit nonce.
///
/// Nonce uniqueness relies on the CSPRNG alone (no counter component); at
/// 96 bits the collision probability over a session's message volume is
/// negligible.
pub fn encrypt(key: &SessionKey, plaintext: &str) -> Result<SealedText, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.raw())
        .map_err(|err| CryptoError::KeyFormat(err.to_string()))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Unavailable("AEAD encryption failed".into()))?;

    Ok(SealedText {
        ciphertext: STANDARD.encode(&ciphertext),
        nonce: STANDARD.encode(nonce),
    })
}

/// Decrypt base64 `ciphertext` + `nonce` under `key`.
///
/// Fails with `DecryptionFailed` when the authentication tag does not verify
/// (wrong key, tampered ciphertext, or mismatched nonce). This is the sole
/// integrity check protecting message confidentiality; it is never bypassed.
pub fn decrypt(key: &SessionKey, ciphertext: &str, nonce: &str) -> Result<String, CryptoError> {
    let ct = STANDARD.decode(ciphertext)?;
    let nonce_bytes = STANDARD.decode(nonce)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(CryptoError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key.raw())
        .map_err(|err| CryptoError::KeyFormat(err.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ct.as_ref())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
}
