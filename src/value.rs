use std::{cmp::Ordering, sync::LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::evaluator::EvalError;

/// A single cell value used throughout the briq engine.
///
/// Missing data is not a variant of this type: a cell that may be absent is a
/// [`Datum`], and `None` is the missing marker. Every operator therefore has to
/// say explicitly what it does with missing input.
///
/// # Examples
///
/// ```
/// use briq::value::{Datum, Value, MISSING};
///
/// let logical = Value::Logical(true);
/// let number = Value::Number(42.0);
/// let text = Value::Text("hello".to_string());
/// let absent: Datum = MISSING;
/// assert!(absent.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// true/false
    Logical(bool),

    /// Finite floating-point number. Non-finite results become missing.
    Number(f64),

    /// UTF-8 text
    Text(String),

    /// Calendar date and wall-clock time
    Datetime(NaiveDateTime),
}

/// A value that may be missing.
pub type Datum = Option<Value>;

/// The missing marker.
pub const MISSING: Datum = None;

static NUMBER_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("valid number pattern")
});

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Logical(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Datetime(_) => true,
        }
    }

    /// Get as float
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as datetime
    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Datetime(d) => Some(d),
            _ => None,
        }
    }

    /// Human-readable name of the runtime type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Logical(_) => "logical",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Datetime(_) => "datetime",
        }
    }

    /// Textual form used by `toText` and CSV output.
    pub fn to_text(&self) -> String {
        match self {
            Value::Logical(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Datetime(d) => format_datetime(d),
        }
    }
}

/// Format a datetime as ISO-8601 text, omitting a zero fraction.
pub fn format_datetime(d: &NaiveDateTime) -> String {
    d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Type name of a possibly-missing value.
pub fn type_name(d: &Datum) -> &'static str {
    match d {
        None => "missing",
        Some(v) => v.type_name(),
    }
}

pub fn is_missing(d: &Datum) -> bool {
    d.is_none()
}

/// Truthiness. Missing, `false`, zero and empty text are falsy.
pub fn make_logical(d: &Datum) -> bool {
    d.as_ref().is_some_and(Value::is_truthy)
}

/// Coerce to a number, yielding missing when no sensible number exists.
///
/// Logical values become 0/1 and datetimes become milliseconds since the Unix
/// epoch. Text must look like a decimal number; words such as `inf` or `NaN`
/// are rejected.
pub fn make_number(d: &Datum) -> Datum {
    match d {
        None => None,
        Some(Value::Number(n)) => safe_value(*n),
        Some(Value::Logical(b)) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
        Some(Value::Text(s)) => {
            if !NUMBER_TEXT.is_match(s) {
                return None;
            }
            s.trim().parse::<f64>().ok().and_then(safe_value)
        }
        Some(Value::Datetime(dt)) => safe_value(dt.and_utc().timestamp_millis() as f64),
    }
}

/// Coerce to a datetime, yielding missing for anything unparseable.
///
/// Numbers are read as milliseconds since the Unix epoch.
pub fn make_date(d: &Datum) -> Datum {
    match d {
        None | Some(Value::Logical(_)) => None,
        Some(Value::Datetime(dt)) => Some(Value::Datetime(*dt)),
        Some(Value::Number(n)) => {
            if !n.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(*n as i64).map(|dt| Value::Datetime(dt.naive_utc()))
        }
        Some(Value::Text(s)) => parse_datetime(s.trim()).map(Value::Datetime),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Normalize a numeric result: non-finite becomes missing.
pub fn safe_value(n: f64) -> Datum {
    if n.is_finite() {
        Some(Value::Number(n))
    } else {
        None
    }
}

/// Require a number (or missing).
pub fn check_number(d: &Datum, species: &str) -> Result<(), EvalError> {
    match d {
        None | Some(Value::Number(_)) => Ok(()),
        Some(v) => Err(EvalError::TypeError(format!(
            "Require number for {}, got {}",
            species,
            v.type_name()
        ))),
    }
}

/// Require a logical value (or missing).
pub fn check_logical(d: &Datum, species: &str) -> Result<(), EvalError> {
    match d {
        None | Some(Value::Logical(_)) => Ok(()),
        Some(v) => Err(EvalError::TypeError(format!(
            "Require logical for {}, got {}",
            species,
            v.type_name()
        ))),
    }
}

/// Require a datetime (or missing).
pub fn check_datetime(d: &Datum, species: &str) -> Result<(), EvalError> {
    match d {
        None | Some(Value::Datetime(_)) => Ok(()),
        Some(v) => Err(EvalError::TypeError(format!(
            "Require datetime for {}, got {}",
            species,
            v.type_name()
        ))),
    }
}

/// Require two values of the same runtime type. Missing matches anything.
pub fn check_type_equal(left: &Datum, right: &Datum, species: &str) -> Result<(), EvalError> {
    match (left, right) {
        (Some(a), Some(b)) if a.type_name() != b.type_name() => Err(EvalError::TypeError(
            format!(
                "Require equal types for {}, got {} and {}",
                species,
                a.type_name(),
                b.type_name()
            ),
        )),
        _ => Ok(()),
    }
}

/// Type-aware equality between two present values.
pub fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Logical(a), Value::Logical(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Datetime(a), Value::Datetime(b)) => a.and_utc() == b.and_utc(),
        _ => false,
    }
}

/// Native ordering of two values of the same type; `None` across types.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Logical(a), Value::Logical(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Datetime(a), Value::Datetime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Ordering used by `sort`: missing is lower than every present value.
pub fn compare_datums(left: &Datum, right: &Datum) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}
