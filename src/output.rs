//! JSON and CSV output.
//!
//! Programs, pipelines, stages and expressions are written back in the
//! object form the parser reads, so a parsed program can be saved and loaded
//! again unchanged. Tables are written as arrays of row objects (JSON) or
//! with a header line (CSV).
//!
//! # Examples
//!
//! ```
//! use briq::{BinOp, Expr};
//! use briq::output::{expr_to_json, to_json};
//!
//! let expr = Expr::binary(BinOp::Add, Expr::column("a"), Expr::number(1.0));
//! let json = to_json(&expr_to_json(&expr));
//! assert!(json.contains(r#""species":"add""#));
//! ```

use std::io::Write;

use serde_json::{Map, Value as JsonValue, json};

use crate::{
    ast::{Expr, Stage},
    parser::{OP_FAMILY, STAGE_FAMILY, VALUE_FAMILY},
    pipeline::Pipeline,
    program::Program,
    table::Table,
    value::{Datum, Value, format_datetime},
};

/// Convert a cell to JSON. Missing becomes `null`, datetimes become ISO-8601
/// text.
///
/// JSON has no datetime type, so [`crate::parse_table`] reads such a cell back
/// as text; a `toDatetime` mutate restores it.
pub fn datum_to_json(d: &Datum) -> JsonValue {
    match d {
        None => JsonValue::Null,
        Some(Value::Logical(b)) => JsonValue::Bool(*b),
        Some(Value::Number(n)) => number_to_json(*n),
        Some(Value::Text(s)) => JsonValue::String(s.clone()),
        Some(Value::Datetime(dt)) => JsonValue::String(format_datetime(dt)),
    }
}

/// Integral values are written without a fractional part.
fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

pub fn expr_to_json(expr: &Expr) -> JsonValue {
    let species = expr.species();
    match expr {
        Expr::Constant(None) | Expr::RowIndex => json!({
            "family": VALUE_FAMILY,
            "species": species,
        }),
        Expr::Constant(Some(value)) => json!({
            "family": VALUE_FAMILY,
            "species": species,
            "value": datum_to_json(&Some(value.clone())),
        }),
        Expr::Column(name) => json!({
            "family": VALUE_FAMILY,
            "species": species,
            "value": name,
        }),
        Expr::Unary { arg, .. } => json!({
            "family": OP_FAMILY,
            "species": species,
            "arg": expr_to_json(arg),
        }),
        Expr::Binary { left, right, .. } => json!({
            "family": OP_FAMILY,
            "species": species,
            "left": expr_to_json(left),
            "right": expr_to_json(right),
        }),
        Expr::IfElse {
            cond,
            then,
            otherwise,
        } => json!({
            "family": OP_FAMILY,
            "species": species,
            "left": expr_to_json(cond),
            "middle": expr_to_json(then),
            "right": expr_to_json(otherwise),
        }),
    }
}

pub fn stage_to_json(stage: &Stage) -> JsonValue {
    let mut node = Map::new();
    node.insert("family".to_string(), json!(STAGE_FAMILY));
    node.insert("kind".to_string(), json!(stage.kind()));

    let mut set = |key: &str, value: JsonValue| {
        node.insert(key.to_string(), value);
    };
    match stage {
        Stage::Drop { columns }
        | Stage::GroupBy { columns }
        | Stage::Select { columns }
        | Stage::Unique { columns } => set("columns", json!(columns)),
        Stage::Filter { expr } => set("expr", expr_to_json(expr)),
        Stage::Join {
            left_table,
            left_column,
            right_table,
            right_column,
        } => {
            set("leftTable", json!(left_table));
            set("leftColumn", json!(left_column));
            set("rightTable", json!(right_table));
            set("rightColumn", json!(right_column));
        }
        Stage::Mutate { column, expr } => {
            set("column", json!(column));
            set("expr", expr_to_json(expr));
        }
        Stage::Notify { signal } => set("signal", json!(signal)),
        Stage::Read { source } => set("source", json!(source)),
        Stage::Sort {
            columns,
            descending,
        } => {
            set("columns", json!(columns));
            set("descending", json!(descending));
        }
        Stage::Summarize { func, column } => {
            set("func", json!(func.name()));
            set("column", json!(column));
        }
        Stage::Ungroup => {}
    }
    JsonValue::Object(node)
}

pub fn pipeline_to_json(pipeline: &Pipeline) -> JsonValue {
    JsonValue::Array(pipeline.stages.iter().map(stage_to_json).collect())
}

pub fn program_to_json(program: &Program) -> JsonValue {
    JsonValue::Object(
        program
            .pipelines()
            .iter()
            .map(|(name, pipeline)| (name.clone(), pipeline_to_json(pipeline)))
            .collect(),
    )
}

/// A table as an array of row objects in column order.
pub fn table_to_json(table: &Table) -> JsonValue {
    JsonValue::Array(
        table
            .rows()
            .iter()
            .map(|row| {
                JsonValue::Object(
                    row.iter()
                        .map(|(k, v)| (k.clone(), datum_to_json(v)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn to_json(value: &JsonValue) -> String {
    value.to_string()
}

/// Pretty-printed with 2-space indentation.
pub fn to_json_pretty(value: &JsonValue) -> String {
    // Serializing an in-memory JSON value cannot fail
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Write a table as CSV with a header line. Missing cells are empty fields.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    if !table.columns().is_empty() {
        out.write_record(table.columns())?;
    }
    for row in table.rows() {
        out.write_record(row.values().map(|d| match d {
            None => String::new(),
            Some(v) => v.to_text(),
        }))?;
    }
    out.flush()?;
    Ok(())
}
