//! Analyse-and-store pipeline for a single sentence.
//!
//! Stages run in order: open the store (schema ready), annotate, hand the
//! tokens to the caller, persist. Fatal errors (store cannot be prepared,
//! model cannot be loaded) are kept apart from recoverable ones.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::models::TokenAnnotation;
use crate::repository::{RepositoryError, SentenceStore};

use super::annotation::{AnnotationError, Annotator, ModelLoadError};

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not prepare the store: {0}")]
    Schema(#[source] RepositoryError),

    #[error(transparent)]
    ModelLoad(ModelLoadError),

    #[error("{0}")]
    Analysis(#[source] AnnotationError),

    #[error("Could not store results: {0}")]
    Persistence(#[source] RepositoryError),
}

impl PipelineError {
    /// Fatal errors abort the invocation; the rest are reported and swallowed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Schema(_) | PipelineError::ModelLoad(_))
    }
}

impl From<AnnotationError> for PipelineError {
    fn from(e: AnnotationError) -> Self {
        match e {
            AnnotationError::ModelLoad(e) => PipelineError::ModelLoad(e),
            other => PipelineError::Analysis(other),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub textid: i64,
    pub tokens: Vec<TokenAnnotation>,
}

/// Where and how to open the store.
#[derive(Debug, Clone)]
pub struct StoreOptions<'a> {
    pub path: &'a Path,
    pub busy_timeout: Duration,
}

/// Analyse `text` and store the result.
///
/// `on_analyzed` sees the tokens after annotation and before anything is
/// written, so output can be produced even if persistence then fails.
pub fn analyze_and_store<A, F>(
    store: &StoreOptions<'_>,
    annotator: &mut A,
    text: &str,
    on_analyzed: F,
) -> Result<Analysis, PipelineError>
where
    A: Annotator + ?Sized,
    F: FnOnce(&[TokenAnnotation]),
{
    let store = SentenceStore::open_with_timeout(store.path, store.busy_timeout)
        .map_err(PipelineError::Schema)?;
    debug!("Store ready at {}", store.database_path().display());

    let tokens = annotator.annotate(text)?;
    debug!(
        "{} produced {} tokens",
        annotator.backend_id(),
        tokens.len()
    );

    on_analyzed(&tokens);

    let textid = store
        .persist(text, &tokens)
        .map_err(PipelineError::Persistence)?;
    debug!("Persisted text {}", textid);

    Ok(Analysis { textid, tokens })
}
