//! Catalog of the language for editor integrations

use serde_json::{Value as JsonValue, json};

use crate::{
    ast::{BinOp, Stage, UnaryOp, operators::IF_ELSE},
    summarize::Summarizer,
};

/// Value leaf species accepted in `@value` nodes.
const VALUE_SPECIES: [&str; 7] = [
    "absent", "logical", "number", "text", "datetime", "column", "rowIndex",
];

/// Everything an editor needs to populate its block palettes.
///
/// ```text
/// {
///   "stages": ["drop", "filter", ...],
///   "operators": {"unary": [...], "binary": [...], "ternary": ["ifElse"]},
///   "values": ["absent", ...],
///   "summarize": ["count", ...]
/// }
/// ```
pub fn catalog() -> JsonValue {
    json!({
        "stages": Stage::KINDS,
        "operators": {
            "unary": UnaryOp::ALL.iter().map(|op| op.species()).collect::<Vec<_>>(),
            "binary": BinOp::ALL.iter().map(|op| op.species()).collect::<Vec<_>>(),
            "ternary": [IF_ELSE],
        },
        "values": VALUE_SPECIES,
        "summarize": Summarizer::OPTIONS,
    })
}
