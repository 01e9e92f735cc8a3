//! Stage engine: applies one [`Stage`] to a table.
//!
//! Every stage consumes its input table and returns a new one. `read` and
//! `join` ignore the input and load tables from the [`RunContext`]; `notify`
//! passes its input through (the pipeline runner records the signal).

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::{
    ast::{Expr, Stage},
    context::RunContext,
    evaluator::{EvalError, evaluate},
    summarize::Summarizer,
    table::{GroupKey, KeyAtom, Row, Table, TableError, key_of},
    value::{Datum, compare_datums, make_logical},
};

/// Name of the key column added by `join`.
pub const JOIN_COLUMN: &str = "_join_";

/// Errors that can occur while applying a stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Table(#[from] TableError),

    /// `read` or `join` named a table that is neither a signal nor a source
    #[error("Unknown table: '{0}' is neither a published signal nor a data source")]
    UnknownTable(String),

    /// Both sides of a join are the same table, so prefixed names would collide
    #[error("Cannot join table '{0}' with itself")]
    SelfJoin(String),

    /// Two prefixed join columns (or one and `_join_`) share a name
    #[error("Join output column '{0}' would appear twice")]
    ColumnCollision(String),
}

/// Apply a single stage to `input`.
pub fn apply_stage(stage: &Stage, input: Table, ctx: &RunContext) -> Result<Table, StageError> {
    debug!(
        "applying {} to {} rows ({} columns)",
        stage.kind(),
        input.len(),
        input.columns().len()
    );
    match stage {
        Stage::Drop { columns } => drop_columns(input, columns),
        Stage::Filter { expr } => filter(input, expr),
        Stage::GroupBy { columns } => Ok(input.group_by(columns.clone())?),
        Stage::Join {
            left_table,
            left_column,
            right_table,
            right_column,
        } => join(ctx, left_table, left_column, right_table, right_column),
        Stage::Mutate { column, expr } => mutate(input, column, expr),
        Stage::Notify { .. } => Ok(input),
        Stage::Read { source } => Ok(load(ctx, source)?.clone()),
        Stage::Select { columns } => select(input, columns),
        Stage::Sort {
            columns,
            descending,
        } => sort(input, columns, *descending),
        Stage::Summarize { func, column } => summarize(input, *func, column),
        Stage::Ungroup => Ok(input.ungroup()),
        Stage::Unique { columns } => unique(input, columns),
    }
}

fn load<'a>(ctx: &'a RunContext, name: &str) -> Result<&'a Table, StageError> {
    ctx.lookup(name)
        .ok_or_else(|| StageError::UnknownTable(name.to_string()))
}

/// Keep the grouping only if every grouping column survives.
fn surviving_grouping(group_columns: Option<Vec<String>>, columns: &[String]) -> Option<Vec<String>> {
    group_columns.filter(|gc| gc.iter().all(|c| columns.contains(c)))
}

fn drop_columns(input: Table, names: &[String]) -> Result<Table, StageError> {
    input.require_columns(names)?;
    let (columns, rows, group_columns) = input.into_parts();

    let columns: Vec<String> = columns.into_iter().filter(|c| !names.contains(c)).collect();
    let rows = rows
        .into_iter()
        .map(|mut row| {
            for name in names {
                row.shift_remove(name);
            }
            row
        })
        .collect();

    let group_columns = surviving_grouping(group_columns, &columns);
    Ok(Table::from_parts(columns, rows, group_columns))
}

fn select(input: Table, names: &[String]) -> Result<Table, StageError> {
    input.require_columns(names)?;
    let (_, rows, group_columns) = input.into_parts();

    let mut seen = HashSet::new();
    let columns: Vec<String> = names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect();
    let rows = rows
        .into_iter()
        .map(|mut row| {
            columns
                .iter()
                .map(|c| (c.clone(), row.swap_remove(c).flatten()))
                .collect()
        })
        .collect();

    let group_columns = surviving_grouping(group_columns, &columns);
    Ok(Table::from_parts(columns, rows, group_columns))
}

fn filter(input: Table, expr: &Expr) -> Result<Table, StageError> {
    input.require_columns(&expr.columns())?;
    let (columns, rows, group_columns) = input.into_parts();

    let mut kept = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        // missing is falsy, so rows that evaluate to missing are dropped
        if make_logical(&evaluate(expr, &row, i)?) {
            kept.push(row);
        }
    }
    Ok(Table::from_parts(columns, kept, group_columns))
}

fn mutate(input: Table, column: &str, expr: &Expr) -> Result<Table, StageError> {
    // checked up front so an empty table still rejects unknown columns
    input.require_columns(&expr.columns())?;
    let values = input
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| evaluate(expr, row, i))
        .collect::<Result<Vec<Datum>, EvalError>>()?;

    let (mut columns, rows, group_columns) = input.into_parts();
    if !columns.iter().any(|c| c == column) {
        columns.push(column.to_string());
    }
    let rows = rows
        .into_iter()
        .zip(values)
        .map(|(mut row, value)| {
            row.insert(column.to_string(), value);
            row
        })
        .collect();
    Ok(Table::from_parts(columns, rows, group_columns))
}

fn unique(input: Table, names: &[String]) -> Result<Table, StageError> {
    input.require_columns(names)?;
    let (columns, rows, group_columns) = input.into_parts();

    let mut seen: HashSet<GroupKey> = HashSet::new();
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(key_of(row, names)))
        .collect();
    Ok(Table::from_parts(columns, rows, group_columns))
}

fn sort(input: Table, names: &[String], descending: bool) -> Result<Table, StageError> {
    input.require_columns(names)?;
    for name in names {
        check_sortable(&input, name)?;
    }
    let (columns, rows, group_columns) = input.into_parts();

    let mut rows = rows;
    // sort_by is stable, so tied rows keep their relative order
    rows.sort_by(|a, b| {
        let ord = names
            .iter()
            .map(|c| compare_datums(&a[c.as_str()], &b[c.as_str()]))
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal);
        if descending { ord.reverse() } else { ord }
    });
    Ok(Table::from_parts(columns, rows, group_columns))
}

/// A sort column may mix missing with one other type, nothing more.
fn check_sortable(table: &Table, name: &str) -> Result<(), StageError> {
    let mut found: Option<&'static str> = None;
    for value in table.column(name)?.into_iter().flatten() {
        let ty = value.type_name();
        match found {
            None => found = Some(ty),
            Some(first) if first != ty => {
                return Err(EvalError::TypeError(format!(
                    "Require equal types for sort on '{}', got {} and {}",
                    name, first, ty
                ))
                .into());
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn summarize(input: Table, func: Summarizer, column: &str) -> Result<Table, StageError> {
    let values = input.column(column)?;

    let (mut columns, keys, members): (Vec<String>, Vec<Vec<Datum>>, Vec<Vec<usize>>) =
        match input.grouping() {
            Some(grouping) => (
                grouping.columns.clone(),
                grouping.groups.iter().map(|g| g.key.clone()).collect(),
                grouping.groups.iter().map(|g| g.rows.clone()).collect(),
            ),
            None => (Vec::new(), vec![Vec::new()], vec![(0..input.len()).collect()]),
        };

    let mut rows = Vec::with_capacity(keys.len());
    for (key, member_rows) in keys.into_iter().zip(members) {
        let group_values: Vec<&Datum> = member_rows.iter().map(|&i| values[i]).collect();
        let result = func.reduce(&group_values)?;

        let mut row: Row = columns.iter().cloned().zip(key).collect();
        row.insert(column.to_string(), result);
        rows.push(row);
    }

    if !columns.iter().any(|c| c == column) {
        columns.push(column.to_string());
    }
    Ok(Table::from_parts(columns, rows, None))
}

fn join(
    ctx: &RunContext,
    left_name: &str,
    left_column: &str,
    right_name: &str,
    right_column: &str,
) -> Result<Table, StageError> {
    if left_name == right_name {
        return Err(StageError::SelfJoin(left_name.to_string()));
    }
    let left = load(ctx, left_name)?;
    let right = load(ctx, right_name)?;
    left.require_columns(&[left_column.to_string()])?;
    right.require_columns(&[right_column.to_string()])?;

    let mut index: IndexMap<KeyAtom, Vec<&Row>> = IndexMap::new();
    for row in right.rows() {
        let key = KeyAtom::from(&row[right_column]);
        // missing never matches anything, including another missing
        if key != KeyAtom::Missing {
            index.entry(key).or_default().push(row);
        }
    }

    let prefixed = |table: &str, column: &str| format!("{}_{}", table, column);
    let mut columns = vec![JOIN_COLUMN.to_string()];
    columns.extend(left.columns().iter().map(|c| prefixed(left_name, c)));
    columns.extend(right.columns().iter().map(|c| prefixed(right_name, c)));

    let mut seen = HashSet::new();
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(StageError::ColumnCollision(dup.clone()));
    }

    let mut rows = Vec::new();
    for left_row in left.rows() {
        let key_value = &left_row[left_column];
        let Some(matches) = index.get(&KeyAtom::from(key_value)) else {
            continue;
        };
        for right_row in matches {
            let mut row = Row::new();
            row.insert(JOIN_COLUMN.to_string(), key_value.clone());
            for (c, v) in left_row {
                row.insert(prefixed(left_name, c), v.clone());
            }
            for (c, v) in right_row.iter() {
                row.insert(prefixed(right_name, c), v.clone());
            }
            rows.push(row);
        }
    }
    Ok(Table::from_parts(columns, rows, None))
}
