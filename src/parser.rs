//! JSON AST parser.
//!
//! Turns editor-produced JSON into [`Expr`], [`Stage`], [`Pipeline`],
//! [`Program`] and [`Table`] values. Two node shapes are accepted:
//!
//! - the object form, `{"family": "@op", "species": "add", "left": .., "right": ..}`
//! - the positional form emitted by block code generators,
//!   `["@op", "add", left, right]`
//!
//! Errors carry a path to the offending node, e.g. `main[2].expr.left`.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Stage, UnaryOp, operators::IF_ELSE},
    pipeline::Pipeline,
    program::Program,
    summarize::Summarizer,
    table::{Row, Table, TableError},
    value::{Datum, Value, make_date},
};

pub const VALUE_FAMILY: &str = "@value";
pub const OP_FAMILY: &str = "@op";
pub const STAGE_FAMILY: &str = "@stage";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("{path}: {message}")]
    Malformed { path: String, message: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

fn malformed(path: &str, message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        message: message.into(),
    }
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

/// A node in either of its two JSON shapes.
enum Shape<'a> {
    Object(&'a Map<String, JsonValue>),
    Positional(&'a [JsonValue]),
}

struct Node<'a> {
    family: &'a str,
    name: &'a str,
    shape: Shape<'a>,
    path: String,
}

impl<'a> Node<'a> {
    fn read(json: &'a JsonValue, path: &str) -> Result<Self, ParseError> {
        match json {
            JsonValue::Object(map) => {
                let family = map
                    .get("family")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| malformed(path, "missing 'family'"))?;
                let name_key = if family == STAGE_FAMILY { "kind" } else { "species" };
                let name = map
                    .get(name_key)
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| malformed(path, format!("missing '{}'", name_key)))?;
                Ok(Node {
                    family,
                    name,
                    shape: Shape::Object(map),
                    path: path.to_string(),
                })
            }
            JsonValue::Array(items) => match (items.first(), items.get(1)) {
                (Some(JsonValue::String(family)), Some(JsonValue::String(name))) => Ok(Node {
                    family,
                    name,
                    shape: Shape::Positional(&items[2..]),
                    path: path.to_string(),
                }),
                _ => Err(malformed(path, "expected [family, name, ...]")),
            },
            other => Err(malformed(path, format!("expected a node, got {}", other))),
        }
    }

    /// A field by name (object form) or by position after family and name.
    fn field(&self, key: &str, position: usize) -> Option<&'a JsonValue> {
        match self.shape {
            Shape::Object(map) => map.get(key),
            Shape::Positional(items) => items.get(position),
        }
    }

    fn required(&self, key: &str, position: usize) -> Result<&'a JsonValue, ParseError> {
        self.field(key, position)
            .ok_or_else(|| malformed(&self.path, format!("{} requires '{}'", self.name, key)))
    }

    fn string(&self, key: &str, position: usize) -> Result<String, ParseError> {
        match self.required(key, position)? {
            JsonValue::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => Err(malformed(
                &join_path(&self.path, key),
                "expected a non-empty string",
            )),
        }
    }

    fn expr(&self, key: &str, position: usize) -> Result<Expr, ParseError> {
        parse_expr_at(self.required(key, position)?, &join_path(&self.path, key))
    }

    /// Column lists are arrays of names or a comma-separated string.
    fn columns(&self, key: &str, position: usize) -> Result<Vec<String>, ParseError> {
        let path = join_path(&self.path, key);
        let names: Vec<String> = match self.required(key, position)? {
            JsonValue::String(s) => s.split(',').map(|c| c.trim().to_string()).collect(),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| malformed(&path, "column names must be strings"))
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(malformed(&path, "expected a list of column names")),
        };
        let names: Vec<String> = names.into_iter().filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return Err(malformed(&path, format!("{} requires at least one column", self.name)));
        }
        Ok(names)
    }
}

/// Parse an expression node.
pub fn parse_expr(json: &JsonValue) -> Result<Expr, ParseError> {
    parse_expr_at(json, "")
}

fn parse_expr_at(json: &JsonValue, path: &str) -> Result<Expr, ParseError> {
    let node = Node::read(json, path)?;
    match node.family {
        VALUE_FAMILY => parse_leaf(&node),
        OP_FAMILY => parse_op(&node),
        other => Err(malformed(path, format!("expected an expression, got family '{}'", other))),
    }
}

fn parse_leaf(node: &Node<'_>) -> Result<Expr, ParseError> {
    let path = join_path(&node.path, "value");
    match node.name {
        "absent" => Ok(Expr::Constant(None)),
        "rowIndex" => Ok(Expr::RowIndex),
        "column" => Ok(Expr::Column(node.string("value", 0)?)),
        "logical" => match node.required("value", 0)? {
            JsonValue::Bool(b) => Ok(Expr::logical(*b)),
            _ => Err(malformed(&path, "expected true or false")),
        },
        "number" => node
            .required("value", 0)?
            .as_f64()
            .filter(|n| n.is_finite())
            .map(Expr::number)
            .ok_or_else(|| malformed(&path, "expected a finite number")),
        "text" | "string" => match node.required("value", 0)? {
            JsonValue::String(s) => Ok(Expr::text(s.clone())),
            _ => Err(malformed(&path, "expected a string")),
        },
        "datetime" => {
            let raw = json_to_datum(node.required("value", 0)?, &path)?;
            match make_date(&raw) {
                Some(dt) => Ok(Expr::Constant(Some(dt))),
                None => Err(malformed(&path, "expected an ISO-8601 datetime")),
            }
        }
        other => Err(malformed(&node.path, format!("unknown value species '{}'", other))),
    }
}

fn parse_op(node: &Node<'_>) -> Result<Expr, ParseError> {
    if let Some(op) = UnaryOp::from_species(node.name) {
        return Ok(Expr::unary(op, node.expr("arg", 0)?));
    }
    if let Some(op) = BinOp::from_species(node.name) {
        return Ok(Expr::binary(op, node.expr("left", 0)?, node.expr("right", 1)?));
    }
    if node.name == IF_ELSE {
        return Ok(Expr::if_else(
            node.expr("left", 0)?,
            node.expr("middle", 1)?,
            node.expr("right", 2)?,
        ));
    }
    Err(malformed(&node.path, format!("unknown operator '{}'", node.name)))
}

/// Parse a stage node.
pub fn parse_stage(json: &JsonValue) -> Result<Stage, ParseError> {
    parse_stage_at(json, "")
}

fn parse_stage_at(json: &JsonValue, path: &str) -> Result<Stage, ParseError> {
    let node = Node::read(json, path)?;
    if node.family != STAGE_FAMILY {
        return Err(malformed(path, format!("expected a stage, got family '{}'", node.family)));
    }

    let stage = match node.name {
        "drop" => Stage::Drop {
            columns: node.columns("columns", 0)?,
        },
        "filter" => Stage::Filter {
            expr: node.expr("expr", 0)?,
        },
        "groupBy" | "group" => Stage::GroupBy {
            columns: node.columns("columns", 0)?,
        },
        "join" => Stage::Join {
            left_table: node.string("leftTable", 0)?,
            left_column: node.string("leftColumn", 1)?,
            right_table: node.string("rightTable", 2)?,
            right_column: node.string("rightColumn", 3)?,
        },
        "mutate" => Stage::Mutate {
            column: node.string("column", 0)?,
            expr: node.expr("expr", 1)?,
        },
        "notify" => Stage::Notify {
            signal: node.string("signal", 0)?,
        },
        "read" => Stage::Read {
            source: node.string("source", 0)?,
        },
        "select" => Stage::Select {
            columns: node.columns("columns", 0)?,
        },
        "sort" => Stage::Sort {
            columns: node.columns("columns", 0)?,
            descending: match node.field("descending", 1) {
                None | Some(JsonValue::Null) => false,
                Some(JsonValue::Bool(b)) => *b,
                Some(_) => {
                    return Err(malformed(
                        &join_path(path, "descending"),
                        "expected true or false",
                    ));
                }
            },
        },
        "summarize" => {
            let name = node.string("func", 0)?;
            let func = Summarizer::from_name(&name).ok_or_else(|| {
                malformed(
                    &join_path(path, "func"),
                    format!(
                        "unknown summarize function '{}' (expected one of {})",
                        name,
                        Summarizer::OPTIONS.join(", ")
                    ),
                )
            })?;
            Stage::Summarize {
                func,
                column: node.string("column", 1)?,
            }
        }
        "ungroup" => Stage::Ungroup,
        "unique" => Stage::Unique {
            columns: node.columns("columns", 0)?,
        },
        other => return Err(malformed(path, format!("unknown stage kind '{}'", other))),
    };
    Ok(stage)
}

/// Parse a pipeline: a JSON array of stages.
pub fn parse_pipeline(json: &JsonValue) -> Result<Pipeline, ParseError> {
    parse_pipeline_at(json, "")
}

fn parse_pipeline_at(json: &JsonValue, path: &str) -> Result<Pipeline, ParseError> {
    let JsonValue::Array(items) = json else {
        return Err(malformed(path, "expected an array of stages"));
    };
    let stages = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_stage_at(item, &format!("{}[{}]", path, i)))
        .collect::<Result<_, _>>()?;
    Ok(Pipeline::new(stages))
}

/// Parse a program: a JSON object mapping pipeline names to pipelines.
pub fn parse_program(json: &JsonValue) -> Result<Program, ParseError> {
    let JsonValue::Object(map) = json else {
        return Err(malformed("", "expected an object of named pipelines"));
    };
    let mut program = Program::new();
    for (name, pipeline) in map {
        program.insert(name.clone(), parse_pipeline_at(pipeline, name)?);
    }
    Ok(program)
}

/// Parse a program from JSON text.
pub fn parse_program_str(text: &str) -> Result<Program, ParseError> {
    let json: JsonValue = serde_json::from_str(text)?;
    parse_program(&json)
}

/// Parse a table: a JSON array of row objects.
///
/// Strings are always text, including ISO-8601 datetimes.
pub fn parse_table(json: &JsonValue) -> Result<Table, ParseError> {
    let JsonValue::Array(items) = json else {
        return Err(malformed("", "expected an array of rows"));
    };
    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("[{}]", i);
        let JsonValue::Object(fields) = item else {
            return Err(malformed(&path, "expected a row object"));
        };
        let row = fields
            .iter()
            .map(|(k, v)| Ok((k.clone(), json_to_datum(v, &join_path(&path, k))?)))
            .collect::<Result<Row, ParseError>>()?;
        rows.push(row);
    }
    Ok(Table::from_rows(rows)?)
}

/// Convert a scalar JSON value into a cell.
pub fn json_to_datum(json: &JsonValue, path: &str) -> Result<Datum, ParseError> {
    match json {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(b) => Ok(Some(Value::Logical(*b))),
        JsonValue::Number(n) => n
            .as_f64()
            .filter(|n| n.is_finite())
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| malformed(path, "number out of range")),
        JsonValue::String(s) => Ok(Some(Value::Text(s.clone()))),
        _ => Err(malformed(path, "expected a scalar value")),
    }
}
