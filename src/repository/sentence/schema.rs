//! Database schema initialization and version checks.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{SentenceStore, SCHEMA_VERSION};
use crate::repository::{RepositoryError, Result};

impl SentenceStore {
    /// Initialize the database schema.
    ///
    /// Safe to call on every open: existing tables are never altered or dropped.
    /// Runs in one transaction, so a refused store is left as it was found.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        reject_legacy_layout(&tx)?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS texts (
                textid INTEGER PRIMARY KEY,
                text TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parts (
                textid INTEGER NOT NULL,
                tokenid INTEGER,
                "start" INTEGER NOT NULL,
                "end" INTEGER,
                tag TEXT,
                pos TEXT,
                morph TEXT,
                lemma TEXT,
                dep TEXT,
                head INTEGER,
                PRIMARY KEY (textid, tokenid),
                FOREIGN KEY (textid) REFERENCES texts(textid)
            );

            CREATE TABLE IF NOT EXISTS storage_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;

        let recorded: Option<String> = tx
            .query_row(
                "SELECT value FROM storage_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match recorded {
            None => {
                tx.execute(
                    "INSERT OR IGNORE INTO storage_meta (key, value) VALUES ('schema_version', ?)",
                    params![SCHEMA_VERSION.to_string()],
                )?;
                tx.execute(
                    "INSERT OR IGNORE INTO storage_meta (key, value) VALUES ('initialized_at', ?)",
                    params![Utc::now().to_rfc3339()],
                )?;
                info!(
                    "Initialized sentence store {} at schema version {}",
                    self.db_path.display(),
                    SCHEMA_VERSION
                );
            }
            Some(version) if version.trim().parse::<i32>().ok() == Some(SCHEMA_VERSION) => {
                debug!("Sentence store schema version {} is current", version);
            }
            Some(version) => {
                return Err(RepositoryError::IncompatibleSchema(format!(
                    "store records schema version {}, this build writes version {}",
                    version, SCHEMA_VERSION
                )));
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Recorded schema version, if the store has one.
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let conn = self.connect()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM storage_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.and_then(|v| v.trim().parse().ok()))
    }
}

/// Column names of `table`, empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?)")?;
    let columns = stmt
        .query_map(params![table], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(columns)
}

/// Refuse stores created with the single-key `texts(id, content)` layout.
fn reject_legacy_layout(conn: &Connection) -> Result<()> {
    for (table, key) in [("texts", "textid"), ("parts", "tokenid")] {
        let columns = table_columns(conn, table)?;
        if !columns.is_empty() && !columns.iter().any(|c| c == key) {
            return Err(RepositoryError::IncompatibleSchema(format!(
                "table `{}` has columns ({}) without `{}`; the store was written by the version 1 layout",
                table,
                columns.join(", "),
                key
            )));
        }
    }
    Ok(())
}
