//! CLI support for briq
//!
//! Provides programmatic access to the briq commands so that hosts can run
//! or validate programs without going through the binary.

mod check;
mod convert;
mod docs;
mod run;

pub use check::{CheckOptions, execute_check};
pub use convert::{load_source, parse_csv_table, parse_source_arg};
pub use docs::catalog;
pub use run::{OutputFormat, RunOptions, RunSummary, execute_run};

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Program error: {0}")]
    Program(#[from] crate::ProgramError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot read '{}': {source}", .path.display())]
    File { path: PathBuf, source: io::Error },

    /// `--source` argument not of the form `name=path`
    #[error("Invalid source '{0}': expected name=path")]
    SourceArg(String),

    #[error("Duplicate CSV header '{0}'")]
    DuplicateHeader(String),

    #[error("Unsupported source format '{}': expected .csv or .json", .0.display())]
    SourceFormat(PathBuf),
}
