//! Repository layer for SQLite persistence.
//!
//! Every operation opens its own connection and drops it before returning,
//! so no handle outlives the call that needed it.

mod sentence;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

use crate::models::TokenError;

pub use sentence::{SentenceStore, SCHEMA_VERSION};

/// Default time a writer waits on a locked store before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Incompatible store schema: {0}")]
    IncompatibleSchema(String),

    #[error("Refusing to store invalid tokens: {0}")]
    InvalidTokens(#[from] TokenError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open a database connection with foreign keys enforced.
pub(crate) fn connect(db_path: &Path, busy_timeout: Duration) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}
