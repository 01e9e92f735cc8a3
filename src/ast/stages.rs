use crate::{ast::Expr, summarize::Summarizer};

/// A whole-table transform step.
///
/// Field requirements (non-empty column lists, known summarize functions) are
/// enforced by the parser, so a `Stage` value is always runnable.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Remove the named columns.
    Drop { columns: Vec<String> },

    /// Keep rows whose expression is truthy.
    Filter { expr: Expr },

    /// Partition rows by the values of the named columns.
    GroupBy { columns: Vec<String> },

    /// Inner join of two named tables on one column each.
    ///
    /// # Example
    /// ```text
    /// {"family": "@stage", "kind": "join",
    ///  "leftTable": "people", "leftColumn": "id",
    ///  "rightTable": "orders", "rightColumn": "person"}
    /// ```
    Join {
        left_table: String,
        left_column: String,
        right_table: String,
        right_column: String,
    },

    /// Add or overwrite a column with a per-row value.
    Mutate { column: String, expr: Expr },

    /// Publish the current table under a signal name.
    Notify { signal: String },

    /// Load a table from a published signal or an external source.
    Read { source: String },

    /// Keep only the named columns.
    Select { columns: Vec<String> },

    /// Stable sort by the named columns.
    Sort {
        columns: Vec<String>,
        descending: bool,
    },

    /// Reduce each group to one row.
    Summarize { func: Summarizer, column: String },

    /// Clear the grouping.
    Ungroup,

    /// Keep the first row per distinct tuple of the named columns.
    Unique { columns: Vec<String> },
}

impl Stage {
    /// Every stage kind, in the order editors list them.
    pub const KINDS: [&'static str; 12] = [
        "drop",
        "filter",
        "groupBy",
        "join",
        "mutate",
        "notify",
        "read",
        "select",
        "sort",
        "summarize",
        "ungroup",
        "unique",
    ];

    /// The kind name used in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Stage::Drop { .. } => "drop",
            Stage::Filter { .. } => "filter",
            Stage::GroupBy { .. } => "groupBy",
            Stage::Join { .. } => "join",
            Stage::Mutate { .. } => "mutate",
            Stage::Notify { .. } => "notify",
            Stage::Read { .. } => "read",
            Stage::Select { .. } => "select",
            Stage::Sort { .. } => "sort",
            Stage::Summarize { .. } => "summarize",
            Stage::Ungroup => "ungroup",
            Stage::Unique { .. } => "unique",
        }
    }

    /// Names of tables this stage loads (sources or signals).
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Stage::Read { source } => vec![source.as_str()],
            Stage::Join {
                left_table,
                right_table,
                ..
            } => vec![left_table.as_str(), right_table.as_str()],
            _ => Vec::new(),
        }
    }

    /// Signal this stage publishes, if any.
    pub fn signal(&self) -> Option<&str> {
        match self {
            Stage::Notify { signal } => Some(signal),
            _ => None,
        }
    }
}
