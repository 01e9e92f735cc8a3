use chrono::{Datelike, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, UnaryOp},
    table::Row,
    value::{
        Datum, Value, check_datetime, check_logical, check_number, check_type_equal, compare,
        equal, make_date, make_logical, make_number, safe_value,
    },
};

/// Errors that can occur during expression evaluation.
///
/// Missing values are not errors: they flow through [`Datum`]. These are the
/// structural failures that end a pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Operand of the wrong runtime type for an operator
    #[error("Type error: {0}")]
    TypeError(String),

    /// Column reference to a column the row does not have
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),
}

/// Evaluates an expression against one row.
///
/// `index` is the row's position in its table; it is what the `rowIndex` leaf
/// returns. Evaluation is pure: the same node, row and index always give the
/// same result.
///
/// # Examples
///
/// ```
/// use briq::{BinOp, Expr, Row, Value, evaluate};
///
/// let mut row = Row::new();
/// row.insert("price".to_string(), Some(Value::Number(100.0)));
///
/// let expr = Expr::binary(BinOp::Greater, Expr::column("price"), Expr::number(50.0));
/// assert_eq!(evaluate(&expr, &row, 0).unwrap(), Some(Value::Logical(true)));
///
/// // Division by zero is not an error; the result is missing.
/// let expr = Expr::binary(BinOp::Divide, Expr::column("price"), Expr::number(0.0));
/// assert_eq!(evaluate(&expr, &row, 0).unwrap(), None);
/// ```
pub fn evaluate(expr: &Expr, row: &Row, index: usize) -> Result<Datum, EvalError> {
    match expr {
        Expr::Constant(d) => Ok(d.clone()),
        Expr::Column(name) => row
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownColumn(name.clone())),
        Expr::RowIndex => Ok(Some(Value::Number(index as f64))),
        Expr::Unary { op, arg } => {
            let value = evaluate(arg, row, index)?;
            apply_unary(*op, value)
        }
        Expr::Binary { op, left, right } => match op {
            BinOp::Add
            | BinOp::Subtract
            | BinOp::Multiply
            | BinOp::Divide
            | BinOp::Power
            | BinOp::Remainder => arithmetic(*op, left, right, row, index),
            BinOp::Equal
            | BinOp::NotEqual
            | BinOp::Greater
            | BinOp::GreaterEqual
            | BinOp::Less
            | BinOp::LessEqual => comparison(*op, left, right, row, index),
            // Short-circuit: a falsy (or missing) left side is returned as-is
            // and the right side is never evaluated.
            BinOp::And => {
                let left = evaluate(left, row, index)?;
                if !make_logical(&left) {
                    return Ok(left);
                }
                evaluate(right, row, index)
            }
            BinOp::Or => {
                let left = evaluate(left, row, index)?;
                if make_logical(&left) {
                    return Ok(left);
                }
                evaluate(right, row, index)
            }
        },
        Expr::IfElse {
            cond,
            then,
            otherwise,
        } => match evaluate(cond, row, index)? {
            None => Ok(None),
            c if make_logical(&c) => evaluate(then, row, index),
            _ => evaluate(otherwise, row, index),
        },
    }
}

fn apply_unary(op: UnaryOp, value: Datum) -> Result<Datum, EvalError> {
    let species = op.species();
    match op {
        UnaryOp::Negate => {
            check_number(&value, species)?;
            Ok(value.and_then(|v| v.as_number()).and_then(|n| safe_value(-n)))
        }
        UnaryOp::Not => {
            check_logical(&value, species)?;
            Ok(value.map(|v| Value::Logical(!v.is_truthy())))
        }

        UnaryOp::IsLogical => Ok(type_test(&value, |v| matches!(v, Value::Logical(_)))),
        UnaryOp::IsNumber => Ok(type_test(&value, |v| matches!(v, Value::Number(_)))),
        UnaryOp::IsText => Ok(type_test(&value, |v| matches!(v, Value::Text(_)))),
        UnaryOp::IsDatetime => Ok(type_test(&value, |v| matches!(v, Value::Datetime(_)))),
        UnaryOp::IsMissing => Ok(Some(Value::Logical(value.is_none()))),

        UnaryOp::ToLogical => Ok(value.map(|v| Value::Logical(v.is_truthy()))),
        UnaryOp::ToNumber => Ok(make_number(&value)),
        UnaryOp::ToText => Ok(value.map(|v| Value::Text(v.to_text()))),
        UnaryOp::ToDatetime => Ok(make_date(&value)),

        UnaryOp::ToYear => date_part(value, species, |d| d.year() as f64),
        UnaryOp::ToMonth => date_part(value, species, |d| d.month() as f64),
        UnaryOp::ToDay => date_part(value, species, |d| d.day() as f64),
        UnaryOp::ToWeekday => date_part(value, species, |d| {
            d.weekday().num_days_from_sunday() as f64
        }),
        UnaryOp::ToHours => date_part(value, species, |d| d.hour() as f64),
        UnaryOp::ToMinutes => date_part(value, species, |d| d.minute() as f64),
        UnaryOp::ToSeconds => date_part(value, species, |d| d.second() as f64),
    }
}

fn type_test(value: &Datum, test: impl Fn(&Value) -> bool) -> Datum {
    value.as_ref().map(|v| Value::Logical(test(v)))
}

fn date_part(
    value: Datum,
    species: &str,
    part: impl Fn(&NaiveDateTime) -> f64,
) -> Result<Datum, EvalError> {
    check_datetime(&value, species)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_datetime)
        .map(|d| Value::Number(part(d))))
}

fn arithmetic(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    row: &Row,
    index: usize,
) -> Result<Datum, EvalError> {
    let species = op.species();
    let left = evaluate(left, row, index)?;
    check_number(&left, species)?;
    let right = evaluate(right, row, index)?;
    check_number(&right, species)?;

    let (Some(a), Some(b)) = (
        left.as_ref().and_then(Value::as_number),
        right.as_ref().and_then(Value::as_number),
    ) else {
        return Ok(None);
    };

    let result = match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Power => a.powf(b),
        BinOp::Remainder => a % b,
        _ => unreachable!("{} is not arithmetic", species),
    };
    Ok(safe_value(result))
}

fn comparison(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    row: &Row,
    index: usize,
) -> Result<Datum, EvalError> {
    let species = op.species();
    let left = evaluate(left, row, index)?;
    let right = evaluate(right, row, index)?;
    check_type_equal(&left, &right, species)?;

    let (Some(a), Some(b)) = (&left, &right) else {
        return Ok(None);
    };

    let result = match op {
        BinOp::Equal => equal(a, b),
        BinOp::NotEqual => !equal(a, b),
        _ => {
            let Some(ord) = compare(a, b) else {
                return Err(EvalError::TypeError(format!(
                    "Cannot order {} and {} for {}",
                    a.type_name(),
                    b.type_name(),
                    species
                )));
            };
            match op {
                BinOp::Greater => ord.is_gt(),
                BinOp::GreaterEqual => ord.is_ge(),
                BinOp::Less => ord.is_lt(),
                BinOp::LessEqual => ord.is_le(),
                _ => unreachable!("{} is not a comparison", species),
            }
        }
    };
    Ok(Some(Value::Logical(result)))
}
