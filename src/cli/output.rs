//! Result printing for the two historical output styles.

use std::fmt::Display;
use std::io::{self, Write};

use crate::models::TokenAnnotation;

/// Sentinel printed in `index` format when analysis or storage fails.
pub const FAILURE_SENTINEL: &str = "-1";

/// Completion notice printed in `full` format.
pub const SAVED_NOTICE: &str = "Analysis results saved to the database.";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One token index per line; `-1` on failure
    #[default]
    Index,
    /// `<token>: <pos>, <dep>` per line and a completion notice
    Full,
}

impl OutputFormat {
    pub fn write_tokens(&self, out: &mut dyn Write, tokens: &[TokenAnnotation]) -> io::Result<()> {
        for token in tokens {
            match self {
                OutputFormat::Index => writeln!(out, "{}", token.index)?,
                OutputFormat::Full => writeln!(out, "{}: {}, {}", token.text, token.pos, token.dep)?,
            }
        }
        out.flush()
    }

    pub fn write_saved(&self, out: &mut dyn Write) -> io::Result<()> {
        if *self == OutputFormat::Full {
            writeln!(out, "{}", SAVED_NOTICE)?;
        }
        out.flush()
    }

    pub fn write_failure(&self, out: &mut dyn Write, error: &dyn Display) -> io::Result<()> {
        match self {
            OutputFormat::Index => writeln!(out, "{}", FAILURE_SENTINEL)?,
            OutputFormat::Full => writeln!(out, "Error: {}", error)?,
        }
        out.flush()
    }
}
