//! Tables: ordered rows over a uniform column set, optionally grouped.
//!
//! A grouping records the grouping columns together with the partition of
//! row indices they induce. Stages that rebuild a table pass the grouping
//! columns along and the partition is recomputed, so it never goes stale.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use indexmap::{IndexMap, map::Entry};
use thiserror::Error;

use crate::value::{Datum, Value};

/// One row: column name to value, in column order.
pub type Row = IndexMap<String, Datum>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A stage or expression named a column the table does not have.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// Rows of one table must all carry the same columns.
    #[error("Row {row} has columns {found:?}, expected {expected:?}")]
    RaggedRow {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Hashable image of a value, used to compare tuples of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAtom {
    Missing,
    Logical(bool),
    Number(u64),
    Text(String),
    Datetime(NaiveDateTime),
}

impl From<&Datum> for KeyAtom {
    fn from(d: &Datum) -> Self {
        match d {
            None => KeyAtom::Missing,
            Some(Value::Logical(b)) => KeyAtom::Logical(*b),
            // -0.0 and 0.0 are equal values and must land in the same group
            Some(Value::Number(n)) => {
                let n = if *n == 0.0 { 0.0f64 } else { *n };
                KeyAtom::Number(n.to_bits())
            }
            Some(Value::Text(s)) => KeyAtom::Text(s.clone()),
            Some(Value::Datetime(dt)) => KeyAtom::Datetime(*dt),
        }
    }
}

pub type GroupKey = Vec<KeyAtom>;

/// Build the key of a row over the given columns. Absent columns read as missing.
pub fn key_of(row: &Row, columns: &[String]) -> GroupKey {
    columns
        .iter()
        .map(|c| KeyAtom::from(&row.get(c).cloned().flatten()))
        .collect()
}

/// Rows sharing one tuple of grouping values.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// The grouping values, aligned with [`Grouping::columns`].
    pub key: Vec<Datum>,
    /// Indices of the member rows, ascending.
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub columns: Vec<String>,
    /// Groups in order of first appearance.
    pub groups: Vec<Group>,
}

impl Grouping {
    fn build(rows: &[Row], columns: Vec<String>) -> Self {
        let mut index: IndexMap<GroupKey, Group> = IndexMap::new();
        for (i, row) in rows.iter().enumerate() {
            match index.entry(key_of(row, &columns)) {
                Entry::Occupied(entry) => entry.into_mut().rows.push(i),
                Entry::Vacant(entry) => {
                    let key = columns
                        .iter()
                        .map(|c| row.get(c).cloned().flatten())
                        .collect();
                    entry.insert(Group { key, rows: vec![i] });
                }
            }
        }
        Grouping {
            columns,
            groups: index.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    grouping: Option<Grouping>,
}

impl Table {
    /// An empty table with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from rows, checking that every row has the same columns.
    ///
    /// Column order is taken from the first row; later rows are reordered to
    /// match it.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, TableError> {
        let Some(first) = rows.first() else {
            return Ok(Self::empty());
        };
        let columns: Vec<String> = first.keys().cloned().collect();
        let expected: HashSet<&String> = columns.iter().collect();

        let mut normalized = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let found: HashSet<&String> = row.keys().collect();
            if found != expected {
                return Err(TableError::RaggedRow {
                    row: i,
                    expected: columns.clone(),
                    found: row.keys().cloned().collect(),
                });
            }
            normalized.push(
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().flatten()))
                    .collect(),
            );
        }

        Ok(Self {
            columns,
            rows: normalized,
            grouping: None,
        })
    }

    /// Assemble a table whose rows are already known to match `columns`,
    /// regrouping by `group_columns` if given.
    pub(crate) fn from_parts(
        columns: Vec<String>,
        rows: Vec<Row>,
        group_columns: Option<Vec<String>>,
    ) -> Self {
        let grouping = group_columns.map(|gc| Grouping::build(&rows, gc));
        Self {
            columns,
            rows,
            grouping,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
    }

    pub fn is_grouped(&self) -> bool {
        self.grouping.is_some()
    }

    /// Grouping columns, if the table is grouped.
    pub fn group_columns(&self) -> Option<&[String]> {
        self.grouping.as_ref().map(|g| g.columns.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail on the first name that is not a column of this table.
    pub fn require_columns(&self, names: &[String]) -> Result<(), TableError> {
        match names.iter().find(|n| !self.has_column(n)) {
            Some(name) => Err(TableError::UnknownColumn(name.clone())),
            None => Ok(()),
        }
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Datum>, TableError> {
        if !self.has_column(name) {
            return Err(TableError::UnknownColumn(name.to_string()));
        }
        Ok(self.rows.iter().filter_map(|row| row.get(name)).collect())
    }

    /// Partition rows by the given columns, replacing any earlier grouping.
    pub fn group_by(self, columns: Vec<String>) -> Result<Self, TableError> {
        self.require_columns(&columns)?;
        Ok(Self::from_parts(self.columns, self.rows, Some(columns)))
    }

    pub fn ungroup(self) -> Self {
        Self {
            grouping: None,
            ..self
        }
    }

    /// Split into parts for rebuilding: columns, rows and grouping columns.
    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>, Option<Vec<String>>) {
        let group_columns = self.grouping.map(|g| g.columns);
        (self.columns, self.rows, group_columns)
    }
}
