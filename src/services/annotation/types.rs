//! Errors shared across annotation backends.

use thiserror::Error;

use crate::models::TokenError;

/// The pretrained pipeline could not be brought up. Fatal for an invocation.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Python interpreter not found: {0} (install python3 or set pipeline.python)")]
    InterpreterNotFound(String),

    #[error("Failed to load model '{model}': {message}")]
    LoadFailed { model: String, message: String },

    #[error("Unexpected handshake from model helper: {0}")]
    Handshake(String),

    #[error("IO error starting model helper: {0}")]
    Io(#[source] std::io::Error),
}

/// Errors from annotation backends.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error("Annotation failed: {0}")]
    Failed(String),

    #[error("Model helper exited unexpectedly")]
    PipelineExited,

    #[error("Malformed response from model helper: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Model produced invalid tokens: {0}")]
    InvalidOutput(#[from] TokenError),

    #[error("IO error talking to model helper: {0}")]
    Io(#[from] std::io::Error),
}
