//! Sentence store for SQLite persistence.
//!
//! - `schema`: table creation and schema version checks
//! - `crud`: transactional writes and read-back

mod crud;
mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use super::{Result, DEFAULT_BUSY_TIMEOUT};

/// Schema version written to `storage_meta`. Stores carrying another version
/// (or the legacy `texts(id, content)` layout) are refused.
pub const SCHEMA_VERSION: i32 = 2;

/// SQLite-backed store of analysed sentences and their tokens.
pub struct SentenceStore {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SentenceStore {
    /// Open the store at `db_path`, creating the file and tables if needed.
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open the store with an explicit lock wait.
    pub fn open_with_timeout(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_path_buf(),
            busy_timeout,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path, self.busy_timeout)
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }
}
