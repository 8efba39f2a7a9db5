//! sc_crypto — Sealchat cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - All public APIs return opaque newtypes to prevent accidental misuse.
//!
//! # Module layout
//! - `keypair` — RSA-OAEP (2048-bit, SHA-256) keypairs + portable public-key records
//! - `aead`    — AES-256-GCM encrypt/decrypt with fresh 96-bit random nonces
//! - `error`   — unified error type

pub mod aead;
pub mod error;
pub mod keypair;

pub use aead::SessionKey;
pub use error::CryptoError;
pub use keypair::{PublicKeyRecord, RsaKeyPair};
