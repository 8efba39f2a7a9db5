//! Append-only protocol audit trail.
//!
//! Human-readable, ordered, in-memory, never pruned during a session.
//! Purely observational: the protocol never reads it back. Entries are
//! mirrored to `tracing` so external observers see the same timeline.
//! Entries must never contain key material; callers log ciphertext
//! prefixes at most.

use parking_lot::Mutex;
use serde::Serialize;

/// One audit-trail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationLogEntry {
    pub seq: u64,
    pub entry: String,
}

#[derive(Default)]
pub struct OperationLog {
    entries: Mutex<Vec<OperationLogEntry>>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, assigning the next sequence number.
    pub fn record(&self, entry: impl Into<String>) {
        let entry = entry.into();
        let mut entries = self.entries.lock();
        let seq = entries.len() as u64 + 1;
        tracing::info!(target: "sc_session", event = "protocol_log", seq, "{entry}");
        entries.push(OperationLogEntry { seq, entry });
    }

    /// Snapshot of all entries in order.
    pub fn entries(&self) -> Vec<OperationLogEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
