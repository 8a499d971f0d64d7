//! Token annotation backends.
//!
//! The `Annotator` trait is the seam between the pipeline and the pretrained
//! model. `SpacyAnnotator` hosts a spaCy pipeline in a Python helper process.

mod annotator;
mod model_path;
mod spacy;
mod types;

pub use annotator::Annotator;
pub use model_path::{resolve_model, ModelSource, BUNDLED_MODEL_NAME};
pub use spacy::{PipelineConfig, SpacyAnnotator};
pub use types::{AnnotationError, ModelLoadError};
