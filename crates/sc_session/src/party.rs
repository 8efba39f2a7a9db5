//! Per-identity key material.
//!
//! Each party owns exactly one asymmetric keypair (private half never
//! leaves this struct) and, after a successful exchange, one session key.
//! The session key transitions from absent to present exactly once — no
//! rotation.

use sc_crypto::{PublicKeyRecord, RsaKeyPair, SessionKey};

use crate::error::SessionError;
use crate::oplog::OperationLog;

/// Keypair + (eventual) session key owned by one identity.
#[derive(Default)]
pub struct KeyMaterial {
    key_pair: Option<RsaKeyPair>,
    session_key: Option<SessionKey>,
}

/// A named participant. Exactly two parties take part in a session; sender
/// and recipient roles are symmetric.
pub struct Party {
    name: String,
    key_material: KeyMaterial,
}

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_material: KeyMaterial::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generate this party's RSA keypair, logging the operation.
    pub fn generate_keys(&mut self, log: &OperationLog) -> Result<(), SessionError> {
        log.record(format!("Generating RSA key pair for {}...", self.name));
        self.key_material.key_pair = Some(RsaKeyPair::generate()?);
        log.record(format!("{}'s RSA key pair generated and stored.", self.name));
        Ok(())
    }

    pub fn key_pair(&self) -> Option<&RsaKeyPair> {
        self.key_material.key_pair.as_ref()
    }

    /// Portable public-key export, shareable with the peer.
    pub fn public_record(&self) -> Option<PublicKeyRecord> {
        self.key_material.key_pair.as_ref().map(|p| p.public_record())
    }

    pub fn has_keys(&self) -> bool {
        self.key_material.key_pair.is_some()
    }

    pub fn session_key(&self) -> Option<&SessionKey> {
        self.key_material.session_key.as_ref()
    }

    pub fn has_session_key(&self) -> bool {
        self.key_material.session_key.is_some()
    }

    /// Install the exchanged session key. Exactly-once: a second install is
    /// rejected so single-session semantics hold.
    pub(crate) fn install_session_key(&mut self, key: SessionKey) -> Result<(), SessionError> {
        if self.key_material.session_key.is_some() {
            return Err(SessionError::SessionAlreadyEstablished);
        }
        self.key_material.session_key = Some(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_party_has_no_material() {
        let party = Party::new("Alice");
        assert!(!party.has_keys());
        assert!(!party.has_session_key());
        assert!(party.public_record().is_none());
    }

    #[test]
    fn generate_keys_logs_and_stores() {
        let log = OperationLog::new();
        let mut party = Party::new("Alice");
        party.generate_keys(&log).unwrap();
        assert!(party.has_keys());
        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].entry.contains("Generating RSA key pair for Alice"));
    }

    #[test]
    fn session_key_installs_exactly_once() {
        let mut party = Party::new("Alice");
        party.install_session_key(SessionKey::generate()).unwrap();
        assert!(party.has_session_key());
        assert!(matches!(
            party.install_session_key(SessionKey::generate()),
            Err(SessionError::SessionAlreadyEstablished)
        ));
    }
}
