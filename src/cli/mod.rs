//! Command-line interface.
//!
//! Parses the sentence argument, loads settings, runs the pipeline and maps
//! its outcome to output and an exit code.

mod output;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use tracing::{error, info, warn};

use crate::config::{load_settings, LoadOptions, Settings};
use crate::services::annotation::{Annotator, SpacyAnnotator};
use crate::services::{analyze_and_store, StoreOptions};

pub use output::{OutputFormat, FAILURE_SENTINEL, SAVED_NOTICE};

/// Exit status for success and for caught analysis/storage failures.
pub const EXIT_OK: u8 = 0;

/// Exit status for usage errors and fatal setup failures.
pub const EXIT_FATAL: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "sentdb")]
#[command(about = "Annotate a sentence with spaCy and store its tokens in SQLite")]
#[command(version)]
pub struct Cli {
    /// Sentence to analyse
    #[arg(allow_hyphen_values = true)]
    pub sentence: String,

    /// Output style
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Index)]
    pub format: OutputFormat,

    /// Store path (overrides the settings file)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Settings file (defaults to ./sentdb.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments from the process and run.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; everything else is a usage error.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::from(EXIT_OK)
            };
        }
    };

    let settings = match load_settings(&LoadOptions {
        config: cli.config.clone(),
        database: cli.database.clone(),
    }) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", style("✗").red(), e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let mut annotator = SpacyAnnotator::new(settings.pipeline.clone());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ExitCode::from(execute(&cli, &settings, &mut annotator, &mut out))
}

/// Run one invocation against an annotator, writing results to `out`.
///
/// Returns the process exit status.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    annotator: &mut dyn Annotator,
    out: &mut dyn Write,
) -> u8 {
    let store = StoreOptions {
        path: &settings.database,
        busy_timeout: settings.busy_timeout(),
    };
    let format = cli.format;

    let result = analyze_and_store(&store, annotator, &cli.sentence, |tokens| {
        if let Err(e) = format.write_tokens(out, tokens) {
            warn!("Failed to write results: {}", e);
        }
    });

    match result {
        Ok(analysis) => {
            info!(
                "Stored text {} ({} tokens) in {}",
                analysis.textid,
                analysis.tokens.len(),
                settings.database.display()
            );
            if let Err(e) = format.write_saved(out) {
                warn!("Failed to write results: {}", e);
            }
            EXIT_OK
        }
        Err(e) if e.is_fatal() => {
            eprintln!("{} {}", style("✗").red(), e);
            EXIT_FATAL
        }
        Err(e) => {
            error!("{}", e);
            if let Err(e) = format.write_failure(out, &e) {
                warn!("Failed to write results: {}", e);
            }
            EXIT_OK
        }
    }
}
