//! Run a program document against external sources

use std::{fs, io::Write, path::PathBuf};

use serde_json::{Map, Value as JsonValue, json};

use super::{CliError, load_source};
use crate::{
    Outcome, ProgramReport, RunContext, parse_program_str,
    output::{table_to_json, to_json, to_json_pretty, write_csv},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Path to the program document
    pub program: PathBuf,
    /// External sources as (name, path) pairs
    pub sources: Vec<(String, PathBuf)>,
    /// Pretty-print JSON output
    pub pretty: bool,
    pub format: OutputFormat,
}

/// Counts of pipeline outcomes after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub blocked: usize,
}

impl RunSummary {
    fn of(report: &ProgramReport) -> Self {
        let mut summary = RunSummary::default();
        for outcome in report.outcomes.values() {
            match outcome {
                Outcome::Succeeded(_) => summary.succeeded += 1,
                Outcome::Failed(_) => summary.failed += 1,
                Outcome::Blocked { .. } => summary.blocked += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.blocked == 0
    }
}

/// Load sources, run the program and write every pipeline's outcome to `out`.
pub fn execute_run<W: Write>(options: &RunOptions, out: &mut W) -> Result<RunSummary, CliError> {
    let text = fs::read_to_string(&options.program).map_err(|source| CliError::File {
        path: options.program.clone(),
        source,
    })?;
    let program = parse_program_str(&text)?;

    let mut ctx = RunContext::new();
    for (name, path) in &options.sources {
        ctx.add_source(name.clone(), load_source(path)?);
    }

    let report = program.run(&mut ctx)?;
    match options.format {
        OutputFormat::Json => {
            let json = report_to_json(&report);
            let rendered = if options.pretty {
                to_json_pretty(&json)
            } else {
                to_json(&json)
            };
            writeln!(out, "{}", rendered)?;
        }
        OutputFormat::Csv => write_report_csv(&report, out)?,
    }
    Ok(RunSummary::of(&report))
}

/// One entry per pipeline, keyed by name, in run order.
fn report_to_json(report: &ProgramReport) -> JsonValue {
    let mut entries = Map::new();
    for (name, outcome) in &report.outcomes {
        let entry = match outcome {
            Outcome::Succeeded(table) => json!({
                "status": "succeeded",
                "table": table_to_json(table),
            }),
            Outcome::Failed(err) => json!({
                "status": "failed",
                "stage": err.index,
                "error": err.to_string(),
            }),
            Outcome::Blocked { signal, producer } => json!({
                "status": "blocked",
                "signal": signal,
                "producer": producer,
            }),
        };
        entries.insert(name.clone(), entry);
    }
    JsonValue::Object(entries)
}

/// Each table is preceded by a `# name` line; failures are reported on that line.
fn write_report_csv<W: Write>(report: &ProgramReport, out: &mut W) -> Result<(), CliError> {
    for (name, outcome) in &report.outcomes {
        match outcome {
            Outcome::Succeeded(table) => {
                writeln!(out, "# {}", name)?;
                write_csv(table, &mut *out)?;
            }
            Outcome::Failed(err) => writeln!(out, "# {}: failed: {}", name, err)?,
            Outcome::Blocked { signal, producer } => writeln!(
                out,
                "# {}: blocked: '{}' did not publish '{}'",
                name, producer, signal
            )?,
        }
    }
    Ok(())
}
