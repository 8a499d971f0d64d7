//! Stored sentence model.

use super::TokenAnnotation;

/// A sentence row together with its token rows, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSentence {
    pub textid: i64,
    pub text: String,
    pub tokens: Vec<TokenAnnotation>,
}

impl StoredSentence {
    /// Index of the syntactic root, if the sentence has exactly one.
    pub fn root(&self) -> Option<i64> {
        let mut roots = self.tokens.iter().filter(|t| t.is_root());
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root.index),
            _ => None,
        }
    }
}
