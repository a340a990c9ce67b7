//! Volatile persistence gateway
//!
//! This module provides the `MemoryGateway`, an in-memory implementation
//! of the gateway trait. It gives tests and benchmarks the same commit
//! semantics as the file gateway — the stored document is replaced in
//! full or not at all — without touching the filesystem.

use super::gateway::{LedgerDocument, PersistenceGateway};
use crate::types::LedgerError;
use parking_lot::Mutex;

/// In-memory gateway for tests and benchmarks
///
/// Holds the last committed document behind a mutex. Contents are lost
/// when the gateway is dropped.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<LedgerDocument>,
}

impl MemoryGateway {
    /// Create a gateway with an empty committed state
    pub fn new() -> Self {
        MemoryGateway::default()
    }

    /// Create a gateway whose committed state is `document`
    ///
    /// Useful for tests that open an engine over prepared state.
    pub fn with_document(document: LedgerDocument) -> Self {
        MemoryGateway {
            state: Mutex::new(document),
        }
    }

    /// Snapshot of the currently committed document
    pub fn committed(&self) -> LedgerDocument {
        self.state.lock().clone()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<LedgerDocument, LedgerError> {
        Ok(self.state.lock().clone())
    }

    fn commit(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
        *self.state.lock() = document.clone();
        Ok(())
    }
}
