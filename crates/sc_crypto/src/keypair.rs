//! Asymmetric keypairs for hybrid key transport.
//!
//! RSA-OAEP with a 2048-bit modulus and SHA-256 digest. The asymmetric layer
//! is used for exactly one thing: encrypting a raw symmetric session key
//! under the peer's public key. Bulk message data never touches RSA.
//!
//! Public keys travel as a `PublicKeyRecord` — a JWK-style JSON document
//! carrying only the modulus and exponent (base64url, no padding). The
//! private half never leaves the owning `RsaKeyPair`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CryptoError;

/// Modulus size for generated keys, in bits.
pub const MODULUS_BITS: usize = 2048;

/// OAEP overhead: 2 * hash_len + 2 (SHA-256 → 66 bytes).
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

// ── Portable public-key record ───────────────────────────────────────────────

/// Serializable public-key export. Safe to hand to the peer or publish:
/// contains only the public modulus and exponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Key type tag, always `"RSA"`.
    pub kty: String,
    /// Modulus, big-endian bytes, base64url without padding.
    pub n: String,
    /// Public exponent, big-endian bytes, base64url without padding.
    pub e: String,
}

impl PublicKeyRecord {
    /// Reconstruct a usable public key handle from a record.
    pub fn import(&self) -> Result<RsaPublicKey, CryptoError> {
        if self.kty != "RSA" {
            return Err(CryptoError::KeyFormat(format!(
                "Unsupported key type {:?}",
                self.kty
            )));
        }
        let n = BigUint::from_bytes_be(&URL_SAFE_NO_PAD.decode(&self.n)?);
        let e = BigUint::from_bytes_be(&URL_SAFE_NO_PAD.decode(&self.e)?);
        RsaPublicKey::new(n, e).map_err(|err| CryptoError::KeyFormat(err.to_string()))
    }
}

/// Export a public key to its portable record form.
pub fn export_public_key(public: &RsaPublicKey) -> PublicKeyRecord {
    PublicKeyRecord {
        kty: "RSA".to_string(),
        n: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
    }
}

// ── Keypair ──────────────────────────────────────────────────────────────────

/// An identity's asymmetric keypair. The private key is not exposed;
/// decryption goes through [`RsaKeyPair::decrypt`].
pub struct RsaKeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generate a fresh 2048-bit keypair suitable for OAEP/SHA-256.
    pub fn generate() -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
            .map_err(|err| CryptoError::Unavailable(err.to_string()))?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }

    /// The public half, as a portable record.
    pub fn public_record(&self) -> PublicKeyRecord {
        export_public_key(&self.public)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// OAEP-decrypt bytes produced by [`encrypt`] under the matching public
    /// key. A wrong key or corrupt input yields `DecryptionFailed`, never
    /// partial output.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Maximum OAEP plaintext for a given public key (modulus minus padding).
pub fn max_plaintext_len(public: &RsaPublicKey) -> usize {
    public.size().saturating_sub(OAEP_OVERHEAD)
}

/// OAEP-encrypt `plaintext` under `public`. Input is bounded by the modulus
/// size minus padding overhead (190 bytes at 2048/SHA-256).
pub fn encrypt(public: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let max = max_plaintext_len(public);
    if plaintext.len() > max {
        return Err(CryptoError::PayloadTooLarge {
            size: plaintext.len(),
            max,
        });
    }
    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|err| CryptoError::Unavailable(err.to_string()))
}
