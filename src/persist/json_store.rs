//! File-backed persistence gateway
//!
//! This module provides the `JsonFileGateway`, which stores the ledger
//! document as pretty-printed JSON in a single file and commits by atomic
//! replace: the new document is written to a sibling temp file, fsynced,
//! renamed over the target, and the directory entry is fsynced. A crash at
//! any point leaves either the old document or the new one — never a
//! half-written file.

use super::gateway::{LedgerDocument, PersistenceGateway};
use crate::types::LedgerError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the ledger document inside the data directory
const LEDGER_FILE: &str = "ledger.json";

/// Durable JSON-file gateway
///
/// One instance owns one data directory. Commit calls are serialized by
/// the engine, so the fixed temp-file name cannot collide.
#[derive(Debug)]
pub struct JsonFileGateway {
    /// Path of the committed document
    path: PathBuf,

    /// Sibling temp path; same directory so the rename never crosses a
    /// filesystem boundary
    temp_path: PathBuf,
}

impl JsonFileGateway {
    /// Create a gateway over `data_dir`, creating the directory if needed
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory that holds (or will hold) the ledger file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        Ok(JsonFileGateway {
            path: data_dir.join(LEDGER_FILE),
            temp_path: data_dir.join(format!("{LEDGER_FILE}.tmp")),
        })
    }

    /// Path of the committed ledger document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fsync the data directory so the rename itself is durable
    #[cfg(unix)]
    fn sync_parent_dir(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> Result<(), LedgerError> {
        // Directory fsync is a unix concept; the rename is still atomic.
        Ok(())
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Result<LedgerDocument, LedgerError> {
        if !self.path.exists() {
            return Ok(LedgerDocument::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str(&contents)?;
        Ok(document)
    }

    fn commit(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
        let payload = serde_json::to_vec_pretty(document)?;

        // Write the full document to the temp sibling and flush it to disk
        // before the rename makes it the committed state.
        let mut temp = File::create(&self.temp_path)?;
        temp.write_all(&payload)?;
        temp.sync_all()?;
        drop(temp);

        fs::rename(&self.temp_path, &self.path)?;
        self.sync_parent_dir()?;

        tracing::debug!(
            path = %self.path.display(),
            accounts = document.accounts.len(),
            transactions = document.transactions.len(),
            "ledger document committed"
        );
        Ok(())
    }
}
