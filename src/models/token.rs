//! Token annotation model and sequence invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-token output of an annotation backend.
///
/// Offsets count characters (Unicode scalar values) into the analysed text;
/// `end` is exclusive. `head` is the index of the governing token within the
/// same sentence, and a root token is its own head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    pub index: i64,
    pub text: String,
    pub start: i64,
    pub end: i64,
    /// Fine-grained tag (e.g. Penn Treebank `NNS`).
    pub tag: String,
    /// Coarse universal part of speech (e.g. `NOUN`).
    pub pos: String,
    #[serde(default)]
    pub morph: String,
    pub lemma: String,
    pub dep: String,
    pub head: i64,
}

impl TokenAnnotation {
    pub fn is_root(&self) -> bool {
        self.head == self.index
    }
}

/// Violations of the token sequence invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token at position {position} has index {index}")]
    IndexGap { position: usize, index: i64 },

    #[error("token {index} has invalid offsets {start}..{end}")]
    BadOffsets { index: i64, start: i64, end: i64 },

    #[error("token {index} has head {head} outside 0..{len}")]
    HeadOutOfRange { index: i64, head: i64, len: usize },
}

/// Check that tokens are numbered 0..n in order, that offsets are sane and
/// that every head names a token of the same sequence.
pub fn validate_tokens(tokens: &[TokenAnnotation]) -> Result<(), TokenError> {
    let len = tokens.len();
    for (position, token) in tokens.iter().enumerate() {
        if token.index != position as i64 {
            return Err(TokenError::IndexGap {
                position,
                index: token.index,
            });
        }
        if token.start < 0 || token.end < token.start {
            return Err(TokenError::BadOffsets {
                index: token.index,
                start: token.start,
                end: token.end,
            });
        }
        if token.head < 0 || token.head >= len as i64 {
            return Err(TokenError::HeadOutOfRange {
                index: token.index,
                head: token.head,
                len,
            });
        }
    }
    Ok(())
}

/// Slice `text` by character offsets, returning `None` when out of range.
pub(crate) fn char_slice(text: &str, start: i64, end: i64) -> Option<String> {
    let start = usize::try_from(start).ok()?;
    let end = usize::try_from(end).ok()?;
    if end < start {
        return None;
    }
    let slice: String = text.chars().skip(start).take(end - start).collect();
    (slice.chars().count() == end - start).then_some(slice)
}

#[cfg(test)]
pub(crate) fn token(index: i64, text: &str, start: i64, head: i64) -> TokenAnnotation {
    TokenAnnotation {
        index,
        text: text.to_string(),
        start,
        end: start + text.chars().count() as i64,
        tag: "NN".to_string(),
        pos: "NOUN".to_string(),
        morph: String::new(),
        lemma: text.to_lowercase(),
        dep: if index == head { "ROOT" } else { "dep" }.to_string(),
        head,
    }
}
