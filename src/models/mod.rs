//! Data models for sentdb.

mod sentence;
pub(crate) mod token;

pub use sentence::StoredSentence;
pub use token::{validate_tokens, TokenAnnotation, TokenError};
