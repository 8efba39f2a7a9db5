use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Cryptographic provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid key material: {0}")]
    KeyFormat(String),

    #[error("Plaintext too large for OAEP: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Decryption failed (authentication tag mismatch — possible tampering or wrong key)")]
    DecryptionFailed,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
