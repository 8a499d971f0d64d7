//! Service layer for sentdb.
//!
//! Domain logic separated from the CLI: annotation backends and the
//! analyse-and-store pipeline.

pub mod annotation;
pub mod pipeline;

pub use pipeline::{analyze_and_store, Analysis, PipelineError, StoreOptions};
