//! Annotator trait: shared abstraction for annotation backends.

use crate::models::TokenAnnotation;

use super::types::AnnotationError;

/// A backend that turns a sentence into ordered token annotations.
///
/// Backends load their model lazily on the first `annotate` call; a load
/// failure is reported as `AnnotationError::ModelLoad`.
pub trait Annotator {
    /// Short backend identifier for logs (e.g. "spacy").
    fn backend_id(&self) -> &str;

    /// Annotate a single sentence.
    fn annotate(&mut self, text: &str) -> Result<Vec<TokenAnnotation>, AnnotationError>;
}
