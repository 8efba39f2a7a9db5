//! Backend selection.
//!
//! One concrete backend is chosen at startup; everything above depends
//! only on the [`MessageStore`] interface.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::TransportError;
use crate::file::FileStore;
use crate::live::LiveStore;
use crate::memory::MemoryStore;
use crate::store::MessageStore;

/// Which delivery backend to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// Non-durable in-process store.
    Memory,
    /// Durable JSON flat file.
    File { path: PathBuf },
    /// Push-notification store (managed document-store model).
    Live,
}

impl TransportConfig {
    pub async fn build(&self) -> Result<Arc<dyn MessageStore>, TransportError> {
        match self {
            TransportConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            TransportConfig::File { path } => Ok(Arc::new(FileStore::open(path.clone()).await?)),
            TransportConfig::Live => Ok(Arc::new(LiveStore::new())),
        }
    }
}
