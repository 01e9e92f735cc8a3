//! briq: an interpreter for a block-built tabular data transformation language.
//!
//! Programs arrive as JSON ASTs produced by a visual editor. A program is a
//! set of named pipelines; each pipeline is a sequence of stages that load,
//! filter, reshape and summarize tables. Pipelines hand tables to each other
//! through `notify`/`read` signals, and the [`Program`] coordinator runs them
//! in dependency order.
//!
//! # Examples
//!
//! ```
//! use briq::{RunContext, parse_program_str, parse_table};
//!
//! let program = parse_program_str(r#"{
//!     "main": [
//!         {"family": "@stage", "kind": "read", "source": "people"},
//!         {"family": "@stage", "kind": "sort", "columns": ["age"], "descending": true}
//!     ]
//! }"#).unwrap();
//!
//! let people = parse_table(&serde_json::json!([
//!     {"name": "ann", "age": 31},
//!     {"name": "bob", "age": 47}
//! ])).unwrap();
//!
//! let mut ctx = RunContext::new().with_source("people", people);
//! let report = program.run(&mut ctx).unwrap();
//! let table = report.get("main").and_then(|o| o.table()).unwrap();
//! assert_eq!(table.len(), 2);
//! ```

pub mod ast;
pub mod context;
pub mod evaluator;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod program;
pub mod summarize;
pub mod table;
pub mod transform;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Stage, UnaryOp};
pub use context::RunContext;
pub use evaluator::{EvalError, evaluate};
pub use output::{table_to_json, to_json, to_json_pretty, write_csv};
pub use parser::{
    ParseError, parse_expr, parse_pipeline, parse_program, parse_program_str, parse_stage,
    parse_table,
};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineRun, PipelineState};
pub use program::{Outcome, Program, ProgramError, ProgramReport};
pub use summarize::Summarizer;
pub use table::{Row, Table, TableError};
pub use transform::{StageError, apply_stage};
pub use value::{Datum, MISSING, Value};
