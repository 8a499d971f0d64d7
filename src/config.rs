//! Configuration management for sentdb.
//!
//! Settings come from an optional TOML file, then command-line overrides.
//! Relative paths are taken from the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::repository::DEFAULT_BUSY_TIMEOUT;
use crate::services::annotation::PipelineConfig;

/// Default store filename, created in the working directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "database.db";

/// Settings file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "sentdb.toml";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite store path.
    pub database: PathBuf,
    /// How long a writer waits on a locked store, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Pipeline hosting settings.
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE_FILENAME),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit settings file; must exist when given.
    pub config: Option<PathBuf>,
    /// Store path override.
    pub database: Option<PathBuf>,
}

/// Load settings from the explicit or discovered settings file and apply overrides.
pub fn load_settings(options: &LoadOptions) -> anyhow::Result<Settings> {
    let mut settings = match &options.config {
        Some(path) => read_settings(path)?,
        None => {
            let discovered = Path::new(DEFAULT_CONFIG_FILENAME);
            if discovered.is_file() {
                read_settings(discovered)?
            } else {
                Settings::default()
            }
        }
    };

    if let Some(database) = &options.database {
        settings.database = database.clone();
    }

    debug!("Using settings: {:?}", settings);
    Ok(settings)
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    Settings::from_toml(&text)
        .with_context(|| format!("Invalid settings file {}", path.display()))
}
