use thiserror::Error;

use sc_crypto::CryptoError;
use sc_proto::CodecError;
use sc_transport::TransportError;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The exchange was requested before both parties generated keypairs.
    /// No side effects were performed.
    #[error("Both parties must generate key pairs before the exchange")]
    KeysNotReady,

    /// Re-exchange guard: one session key per session, no rotation.
    #[error("A session key is already established for this party")]
    SessionAlreadyEstablished,

    /// Send/decrypt was requested without a session key.
    #[error("No secure session established — perform the key exchange first")]
    SessionNotEstablished,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Delivery(#[from] TransportError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
