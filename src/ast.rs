//! # briq - Abstract Syntax Tree
//!
//! This module defines the AST that visual editors produce as JSON and the
//! engine consumes.
//!
//! ## Architecture Overview
//!
//! - **[expressions]** - Expression nodes (constants, column references, operators)
//! - **[operators]** - Unary and binary operator species
//! - **[stages]** - Whole-table transform steps
//!
//! ## Core Concepts
//!
//! ### Families
//!
//! Every JSON node carries a `family` tag:
//!
//! - `@value` - constants, column references and the row index
//! - `@op` - operators, identified by their `species`
//! - `@stage` - table transforms, identified by their `kind`
//!
//! ### Pipelines and Programs
//!
//! A pipeline is a JSON array of stages; a program is a JSON object mapping
//! pipeline names to pipelines. Pipelines talk to each other through signals:
//! a `notify` stage publishes its table, and `read`/`join` stages in other
//! pipelines load it by name.
//!
//! ## Examples
//!
//! ### Filter
//!
//! ```text
//! {"family": "@stage", "kind": "filter",
//!  "expr": {"family": "@op", "species": "greater",
//!           "left": {"family": "@value", "species": "column", "value": "price"},
//!           "right": {"family": "@value", "species": "number", "value": 100}}}
//! ```
//!
//! ### Program
//!
//! ```text
//! {"main": [{"family": "@stage", "kind": "read", "source": "orders"},
//!           {"family": "@stage", "kind": "notify", "signal": "cleaned"}],
//!  "report": [{"family": "@stage", "kind": "read", "source": "cleaned"},
//!             {"family": "@stage", "kind": "select", "columns": ["price"]}]}
//! ```
pub mod expressions;
pub mod operators;
pub mod stages;

pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use stages::Stage;
