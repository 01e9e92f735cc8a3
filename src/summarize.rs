//! Aggregation functions usable in a `summarize` stage.

use std::cmp::Ordering;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    evaluator::EvalError,
    value::{Datum, Value, compare, safe_value},
};

/// The fixed catalog of reductions.
///
/// Every function ignores missing values; when nothing but missing values
/// remain the result is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summarizer {
    /// Number of non-missing values
    Count,
    /// Largest value (numbers, text or datetimes)
    Maximum,
    /// Arithmetic mean
    Mean,
    /// Middle value; mean of the two middle values for even counts
    Median,
    /// Smallest value (numbers, text or datetimes)
    Minimum,
    /// Population standard deviation
    StdDev,
    /// Total
    Sum,
    /// Population variance
    Variance,
}

impl Summarizer {
    pub const ALL: [Summarizer; 8] = [
        Summarizer::Count,
        Summarizer::Maximum,
        Summarizer::Mean,
        Summarizer::Median,
        Summarizer::Minimum,
        Summarizer::StdDev,
        Summarizer::Sum,
        Summarizer::Variance,
    ];

    /// Option names in the order editors display them.
    pub const OPTIONS: [&'static str; 8] = [
        "count", "maximum", "mean", "median", "minimum", "stdDev", "sum", "variance",
    ];

    pub fn name(self) -> &'static str {
        match self {
            Summarizer::Count => "count",
            Summarizer::Maximum => "maximum",
            Summarizer::Mean => "mean",
            Summarizer::Median => "median",
            Summarizer::Minimum => "minimum",
            Summarizer::StdDev => "stdDev",
            Summarizer::Sum => "sum",
            Summarizer::Variance => "variance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Reduce a column slice to one value.
    pub fn reduce(self, values: &[&Datum]) -> Result<Datum, EvalError> {
        let present: Vec<&Value> = values.iter().filter_map(|d| d.as_ref()).collect();
        if present.is_empty() {
            return Ok(None);
        }

        match self {
            Summarizer::Count => Ok(Some(Value::Number(present.len() as f64))),
            Summarizer::Maximum => extreme(&present, self.name(), Ordering::Greater),
            Summarizer::Minimum => extreme(&present, self.name(), Ordering::Less),
            Summarizer::Sum => {
                let nums = numbers(&present, self.name())?;
                Ok(safe_value(sum(&nums)))
            }
            Summarizer::Mean => {
                let nums = numbers(&present, self.name())?;
                Ok(safe_value(mean(&nums)))
            }
            Summarizer::Median => {
                let mut nums = numbers(&present, self.name())?;
                nums.sort_by(f64::total_cmp);
                let mid = nums.len() / 2;
                let median = if nums.len() % 2 == 0 {
                    (nums[mid - 1] + nums[mid]) / 2.0
                } else {
                    nums[mid]
                };
                Ok(safe_value(median))
            }
            Summarizer::Variance => {
                let nums = numbers(&present, self.name())?;
                Ok(safe_value(variance(&nums)))
            }
            Summarizer::StdDev => {
                let nums = numbers(&present, self.name())?;
                Ok(safe_value(variance(&nums).sqrt()))
            }
        }
    }
}

fn numbers(values: &[&Value], name: &str) -> Result<Vec<f64>, EvalError> {
    values
        .iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::TypeError(format!(
                "Require number for {}, got {}",
                name,
                other.type_name()
            ))),
        })
        .collect()
}

fn extreme(values: &[&Value], name: &str, wanted: Ordering) -> Result<Datum, EvalError> {
    let mut best = values[0];
    for &item in &values[1..] {
        match compare(item, best) {
            Some(ord) if ord == wanted => best = item,
            Some(_) => {}
            None => {
                return Err(EvalError::TypeError(format!(
                    "Require equal types for {}, got {} and {}",
                    name,
                    best.type_name(),
                    item.type_name()
                )));
            }
        }
    }
    Ok(Some(best.clone()))
}

/// Exact decimal total when every input converts, otherwise `None`.
fn decimal_sum(nums: &[f64]) -> Option<Decimal> {
    nums.iter()
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(Decimal::from_f64(*n)?))
}

fn sum(nums: &[f64]) -> f64 {
    decimal_sum(nums)
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| nums.iter().sum())
}

fn mean(nums: &[f64]) -> f64 {
    decimal_sum(nums)
        .and_then(|d| d.checked_div(Decimal::from(nums.len())))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| nums.iter().sum::<f64>() / nums.len() as f64)
}

fn variance(nums: &[f64]) -> f64 {
    let m = mean(nums);
    nums.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nums.len() as f64
}
