//! Resolution of which pretrained pipeline to load.
//!
//! A packaged install ships the model directory next to the executable; a
//! development checkout relies on the model package installed for Python.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default spaCy pipeline, also the directory name used by packaged installs.
pub const BUNDLED_MODEL_NAME: &str = "en_core_web_sm";

/// Files that mark a directory as a loadable spaCy pipeline.
const MODEL_MARKERS: &[&str] = &["meta.json", "config.cfg"];

/// Where the pipeline is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Name or path given in settings.
    Configured(String),
    /// Model directory shipped alongside the executable.
    Bundled(PathBuf),
    /// Installed model package resolved by spaCy.
    Installed(String),
}

impl ModelSource {
    /// Argument handed to `spacy.load`.
    pub fn load_arg(&self) -> String {
        match self {
            ModelSource::Configured(s) | ModelSource::Installed(s) => s.clone(),
            ModelSource::Bundled(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Configured(s) => write!(f, "{} (configured)", s),
            ModelSource::Bundled(path) => write!(f, "{} (bundled)", path.display()),
            ModelSource::Installed(s) => write!(f, "{} (installed)", s),
        }
    }
}

/// Pick the model to load.
///
/// An explicit setting wins, then a bundled directory next to the executable,
/// then the installed default model name.
pub fn resolve_model(configured: Option<&str>, exe_dir: Option<&Path>) -> ModelSource {
    if let Some(model) = configured.map(str::trim).filter(|m| !m.is_empty()) {
        return ModelSource::Configured(model.to_string());
    }

    if let Some(dir) = exe_dir {
        let candidate = dir.join(BUNDLED_MODEL_NAME);
        if is_model_dir(&candidate) {
            return ModelSource::Bundled(candidate);
        }
    }

    ModelSource::Installed(BUNDLED_MODEL_NAME.to_string())
}

/// Directory containing the running executable.
pub(crate) fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}

fn is_model_dir(dir: &Path) -> bool {
    dir.is_dir() && MODEL_MARKERS.iter().any(|file| dir.join(file).exists())
}
