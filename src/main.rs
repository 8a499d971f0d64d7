//! sentdb - sentence annotation store.
//!
//! Analyses one sentence with a spaCy pipeline and records its tokens,
//! part-of-speech tags, lemmas and dependency parse in a local SQLite file.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if sentdb::cli::is_verbose() {
        "sentdb=info"
    } else {
        "sentdb=warn"
    };

    // Results go to stdout, so logs stay on stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    sentdb::cli::run()
}
