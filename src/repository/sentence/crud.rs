//! Transactional writes and read-back for sentences.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::SentenceStore;
use crate::models::{validate_tokens, StoredSentence, TokenAnnotation};
use crate::models::token::char_slice;
use crate::repository::Result;

impl SentenceStore {
    /// Store a sentence and its tokens as one unit of work.
    ///
    /// Returns the generated `textid`. Nothing is written unless every row
    /// inserts successfully.
    pub fn persist(&self, text: &str, tokens: &[TokenAnnotation]) -> Result<i64> {
        validate_tokens(tokens)?;
        self.write_sentence(text, tokens)
    }

    /// Insert without validating the token sequence. The transaction still
    /// rolls back on any constraint failure.
    pub(crate) fn write_sentence(&self, text: &str, tokens: &[TokenAnnotation]) -> Result<i64> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute("INSERT INTO texts (text) VALUES (?)", params![text])?;
        let textid = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO parts (textid, tokenid, "start", "end", tag, pos, morph, lemma, dep, head)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for token in tokens {
                stmt.execute(params![
                    textid,
                    token.index,
                    token.start,
                    token.end,
                    token.tag,
                    token.pos,
                    token.morph,
                    token.lemma,
                    token.dep,
                    token.head,
                ])?;
            }
        }

        tx.commit()?;
        debug!("Stored text {} with {} tokens", textid, tokens.len());
        Ok(textid)
    }

    /// Get the raw text of a stored sentence.
    pub fn get_text(&self, textid: i64) -> Result<Option<String>> {
        let conn = self.connect()?;
        let text = conn
            .query_row(
                "SELECT text FROM texts WHERE textid = ?",
                params![textid],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    /// Load a sentence with its tokens ordered by `tokenid`.
    ///
    /// Token surface forms are recovered from the stored character offsets.
    pub fn load_sentence(&self, textid: i64) -> Result<Option<StoredSentence>> {
        let Some(text) = self.get_text(textid)? else {
            return Ok(None);
        };

        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.tokenid, p."start", p."end", p.tag, p.pos, p.morph, p.lemma, p.dep, p.head
            FROM parts p
            JOIN texts t ON t.textid = p.textid
            WHERE p.textid = ?
            ORDER BY p.tokenid
            "#,
        )?;

        let tokens = stmt
            .query_map(params![textid], |row| {
                let start: i64 = row.get(1)?;
                let end: i64 = row.get::<_, Option<i64>>(2)?.unwrap_or(start);
                Ok(TokenAnnotation {
                    index: row.get(0)?,
                    text: char_slice(&text, start, end).unwrap_or_default(),
                    start,
                    end,
                    tag: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    pos: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    morph: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    lemma: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    dep: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                    head: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(StoredSentence {
            textid,
            text,
            tokens,
        }))
    }

    /// Number of stored sentences.
    pub fn count_texts(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM texts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of stored token rows for a sentence.
    pub fn count_tokens(&self, textid: i64) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM parts WHERE textid = ?",
            params![textid],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
