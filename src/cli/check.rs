//! Validate a program without running it

use std::{fs, path::PathBuf};

use super::CliError;
use crate::parse_program_str;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Path to the program document
    pub program: PathBuf,
}

/// Parse the program and resolve its dependency graph.
///
/// Returns the order the pipelines would run in.
pub fn execute_check(options: &CheckOptions) -> Result<Vec<String>, CliError> {
    let text = fs::read_to_string(&options.program).map_err(|source| CliError::File {
        path: options.program.clone(),
        source,
    })?;
    let program = parse_program_str(&text)?;
    Ok(program.run_order()?)
}
