//! sc_transport — Append-only message store plus per-identity wake-ups
//!
//! # Contract
//! Every backend satisfies the same capability interface ([`MessageStore`]):
//! - `append`    — atomically persist an envelope, assigning a unique id
//! - `list_all`  — the full ordered history (for initial hydration)
//! - `subscribe` — single-shot long-poll: the next message involving an
//!                 identity, or `None` once the timeout elapses
//!
//! Core correctness never depends on which backend is active. Three are
//! provided:
//! - `memory` — non-durable in-process store (single locked append path)
//! - `file`   — durable JSON flat file with a read-through cache
//! - `live`   — push-notification store modelling a managed document
//!              database's live queries
//!
//! # Missed-message window
//! `subscribe` is not restartable; callers re-invoke it in a loop. The gap
//! between one resolution and the next re-subscribe is a bounded window in
//! which a message can arrive unobserved — it is still visible via
//! `list_all`, which is why clients hydrate from the full history.

pub mod config;
pub mod error;
pub mod file;
pub mod live;
pub mod memory;
pub mod store;
pub mod subscribers;

pub use config::TransportConfig;
pub use error::TransportError;
pub use file::FileStore;
pub use live::LiveStore;
pub use memory::MemoryStore;
pub use store::{MessageStore, DEFAULT_SUBSCRIBE_TIMEOUT};
