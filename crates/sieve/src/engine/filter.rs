//! Filter clause compilation and evaluation.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, TimeDelta};

use super::execution_error;
use crate::error::Result;
use crate::input::{Dataset, Value, parse_date_parts};
use crate::schema::{ColumnType, DatasetSchema, FilterOp};
use crate::spec::{FilterClause, FilterValue};

/// Operand already coerced to the column's type.
#[derive(Debug)]
enum Predicate {
    Eq(Value),
    Neq(Value),
    Compare(FilterOp, Value),
    In(Vec<Value>),
    /// Lowercased needle.
    Contains(String),
    Between(NaiveDateTime, NaiveDateTime),
}

/// A filter clause bound to a dataset column.
#[derive(Debug)]
pub(crate) struct CompiledFilter {
    index: usize,
    predicate: Predicate,
}

impl CompiledFilter {
    /// Resolve the column and coerce the operand once, up front.
    pub(crate) fn compile(
        clause: &FilterClause,
        schema: &DatasetSchema,
        dataset: &Dataset,
    ) -> Result<Self> {
        let column = clause.column.as_str();
        let column_type = schema
            .column_type(column)
            .ok_or_else(|| execution_error(format!("unknown column '{}'", column)))?;
        let index = dataset.column_index(column).ok_or_else(|| {
            execution_error(format!("column '{}' is not present in the dataset", column))
        })?;

        let coerce = |json: &serde_json::Value| {
            Value::from_json(json, column_type).map_err(|e| {
                execution_error(format!("filter on '{}' ({}): {}", column, clause.op, e))
            })
        };

        let predicate = match (clause.op, &clause.value) {
            (FilterOp::Eq, FilterValue::Scalar(v)) => Predicate::Eq(coerce(v)?),
            (FilterOp::Neq, FilterValue::Scalar(v)) => Predicate::Neq(coerce(v)?),
            (op, FilterValue::Scalar(v)) if op.is_ordering() => {
                if !column_type.is_ordered() {
                    return Err(execution_error(format!(
                        "operator '{}' needs a numeric or date column, but '{}' is {}",
                        op, column, column_type
                    )));
                }
                Predicate::Compare(op, coerce(v)?)
            }
            (FilterOp::In, FilterValue::List(items)) => {
                Predicate::In(items.iter().map(coerce).collect::<Result<_>>()?)
            }
            (FilterOp::Contains, FilterValue::Scalar(v)) => {
                if column_type != ColumnType::Text {
                    return Err(execution_error(format!(
                        "operator 'contains' needs a text column, but '{}' is {}",
                        column, column_type
                    )));
                }
                let needle = coerce(v)?.to_string().to_lowercase();
                Predicate::Contains(needle)
            }
            (FilterOp::DateRange, FilterValue::Range(start, end)) => {
                if column_type != ColumnType::Date {
                    return Err(execution_error(format!(
                        "operator 'date_range' needs a date column, but '{}' is {}",
                        column, column_type
                    )));
                }
                let start = date_bound(column, start, false)?;
                let end = date_bound(column, end, true)?;
                Predicate::Between(start, end)
            }
            (op, _) => {
                return Err(execution_error(format!(
                    "operand shape does not fit operator '{}' on '{}'",
                    op, column
                )));
            }
        };

        Ok(Self { index, predicate })
    }

    /// Evaluate against one row. Null cells never match.
    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        let Some(cell) = row.get(self.index).filter(|v| !v.is_null()) else {
            return false;
        };

        match &self.predicate {
            Predicate::Eq(operand) => cell.compare(operand) == Some(Ordering::Equal),
            Predicate::Neq(operand) => cell.compare(operand) != Some(Ordering::Equal),
            Predicate::Compare(op, operand) => match cell.compare(operand) {
                Some(ord) => match op {
                    FilterOp::Gt => ord == Ordering::Greater,
                    FilterOp::Gte => ord != Ordering::Less,
                    FilterOp::Lt => ord == Ordering::Less,
                    FilterOp::Lte => ord != Ordering::Greater,
                    _ => false,
                },
                None => false,
            },
            Predicate::In(candidates) => candidates
                .iter()
                .any(|c| cell.compare(c) == Some(Ordering::Equal)),
            Predicate::Contains(needle) => cell
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
            Predicate::Between(start, end) => {
                cell.as_date().is_some_and(|d| d >= *start && d <= *end)
            }
        }
    }
}

/// Parse one side of a date range. A date-only upper bound covers that whole day.
fn date_bound(column: &str, json: &serde_json::Value, upper: bool) -> Result<NaiveDateTime> {
    let text = json.as_str().ok_or_else(|| {
        execution_error(format!("date_range bound {} on '{}' must be a date string", json, column))
    })?;
    let (date, date_only) = parse_date_parts(text).ok_or_else(|| {
        execution_error(format!("'{}' is not a recognizable date for '{}'", text, column))
    })?;

    if !(upper && date_only) {
        return Ok(date);
    }
    // The last representable day has no successor; clamp to the maximum.
    Ok(date
        .checked_add_signed(TimeDelta::days(1))
        .and_then(|next| next.checked_sub_signed(TimeDelta::nanoseconds(1)))
        .unwrap_or(NaiveDateTime::MAX))
}
