//! sc_session — Sealchat session layer
//!
//! Ties the primitives together: per-party key material, the hybrid key
//! exchange, the per-message lifecycle state machine, and the `ChatClient`
//! that drives send/receive against a delivery transport.
//!
//! # Modules
//! - `party`     — identity + key material (keypair, session key)
//! - `exchange`  — one-directional hybrid key transport between two parties
//! - `lifecycle` — explicit event-driven per-message state machine
//! - `oplog`     — append-only, in-memory protocol audit trail
//! - `client`    — send path, inbox loop, local message view
//! - `error`     — unified error type

pub mod client;
pub mod error;
pub mod exchange;
pub mod lifecycle;
pub mod oplog;
pub mod party;

pub use client::{ChatClient, LocalMessage};
pub use error::SessionError;
pub use exchange::establish_session;
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, StatusIndicator};
pub use oplog::{OperationLog, OperationLogEntry};
pub use party::{KeyMaterial, Party};
