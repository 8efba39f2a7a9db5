//! Hybrid key exchange: transport a fresh symmetric session key from the
//! initiator to the responder under the responder's public key.
//!
//! # Protocol (one direction per call)
//! 1. Initiator generates a fresh AES-256 session key and exports its raw
//!    bytes.
//! 2. Initiator imports the responder's public key from its portable
//!    record.
//! 3. Initiator RSA-OAEP-encrypts the raw key bytes under that public key.
//! 4. The encrypted blob is handed to the responder (a direct in-process
//!    call here — no extra wire encoding).
//! 5. Responder decrypts with its private key, recovering the raw bytes.
//! 6. Both parties import the same raw bytes into local session-key
//!    handles.
//!
//! The install is atomic from the caller's perspective: neither party's
//! session key is set until every cryptographic step has succeeded, so
//! there is no partially-exchanged state. Each step emits an operation-log
//! entry in fixed order.

use zeroize::Zeroizing;

use sc_crypto::{keypair, SessionKey};

use crate::error::SessionError;
use crate::oplog::OperationLog;
use crate::party::Party;

/// Run the exchange between two parties. Fails with `KeysNotReady` (and no
/// side effects) unless both already generated keypairs; fails with
/// `SessionAlreadyEstablished` if either party already holds a session key.
/// Returns the session id assigned to the established session.
pub fn establish_session(
    initiator: &mut Party,
    responder: &mut Party,
    log: &OperationLog,
) -> Result<String, SessionError> {
    if !initiator.has_keys() || !responder.has_keys() {
        return Err(SessionError::KeysNotReady);
    }
    if initiator.has_session_key() || responder.has_session_key() {
        return Err(SessionError::SessionAlreadyEstablished);
    }

    log.record(format!(
        "--- Starting key exchange ({} -> {}) ---",
        initiator.name(),
        responder.name()
    ));

    let (initiator_handle, responder_handle) = {
        let responder_pair = responder.key_pair().ok_or(SessionError::KeysNotReady)?;

        log.record(format!(
            "1. {} generates a new AES-256 session key.",
            initiator.name()
        ));
        let session_key = SessionKey::generate();
        let raw = Zeroizing::new(session_key.raw().to_vec());

        log.record(format!(
            "2. {} imports {}'s public RSA key.",
            initiator.name(),
            responder.name()
        ));
        let responder_public = responder_pair.public_record().import()?;

        log.record(format!(
            "3. {} encrypts the session key with {}'s public key using RSA-OAEP.",
            initiator.name(),
            responder.name()
        ));
        let wrapped = keypair::encrypt(&responder_public, &raw)?;

        log.record(format!(
            "4. {} sends the encrypted session key to {}.",
            initiator.name(),
            responder.name()
        ));

        log.record(format!(
            "5. {} decrypts the session key with their private RSA key.",
            responder.name()
        ));
        let recovered = Zeroizing::new(responder_pair.decrypt(&wrapped)?);

        (SessionKey::from_raw(&raw)?, SessionKey::from_raw(&recovered)?)
    };

    initiator.install_session_key(initiator_handle)?;
    responder.install_session_key(responder_handle)?;

    log.record("6. Both parties now hold the shared session key.");

    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        target: "sc_session",
        event = "key_exchange_complete",
        session_id = %session_id,
        initiator = %initiator.name(),
        responder = %responder.name()
    );
    log.record(format!("--- Key exchange complete (session {session_id}) ---"));

    Ok(session_id)
}
