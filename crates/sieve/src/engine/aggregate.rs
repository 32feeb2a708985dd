//! Grouping and aggregation.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use super::execution_error;
use crate::error::Result;
use crate::input::{Dataset, Value};
use crate::schema::{AggregateFn, DatasetSchema};
use crate::spec::QuerySpec;

/// Name of the row-count column produced by a bare `group_by`.
pub const COUNT_COLUMN: &str = "count";

/// Hashable form of a group key cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Text(String),
    Number(u64),
    Date(NaiveDateTime),
}

impl KeyPart {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(KeyPart::Text(s.clone())),
            // Fold -0.0 into 0.0 so both land in the same group.
            Value::Number(n) if *n == 0.0 => Some(KeyPart::Number(0f64.to_bits())),
            Value::Number(n) => Some(KeyPart::Number(n.to_bits())),
            Value::Date(d) => Some(KeyPart::Date(*d)),
        }
    }
}

struct Target {
    index: usize,
    function: AggregateFn,
}

/// Partition `rows` by the spec's `group_by` columns and aggregate each group.
///
/// Groups appear in order of first appearance. Output columns are the group
/// columns followed by one column per aggregation, named after its source
/// column. Rows with a null group key are dropped.
pub(crate) fn aggregate(
    rows: &[&Vec<Value>],
    spec: &QuerySpec,
    schema: &DatasetSchema,
    dataset: &Dataset,
) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    let key_indices = spec
        .group_by
        .iter()
        .map(|name| {
            dataset.column_index(name).ok_or_else(|| {
                execution_error(format!("group_by column '{}' is not present in the dataset", name))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let targets = resolve_targets(spec, schema, dataset)?;

    let mut columns: Vec<String> = spec.group_by.clone();
    if targets.is_empty() {
        columns.push(COUNT_COLUMN.to_string());
    } else {
        columns.extend(spec.aggregations.keys().cloned());
    }

    if spec.group_by.is_empty() {
        // Global aggregate; nothing to summarize when no rows survived filtering.
        if rows.is_empty() {
            return Ok((columns, Vec::new()));
        }
        let row = targets.iter().map(|t| compute(rows, t)).collect();
        return Ok((columns, vec![row]));
    }

    let mut groups: IndexMap<Vec<KeyPart>, Vec<&Vec<Value>>> = IndexMap::new();
    for row in rows {
        let key: Option<Vec<KeyPart>> = key_indices
            .iter()
            .map(|&i| KeyPart::from_value(&row[i]))
            .collect();
        if let Some(key) = key {
            groups.entry(key).or_default().push(*row);
        }
    }

    let output = groups
        .values()
        .map(|members| {
            let mut out: Vec<Value> = key_indices.iter().map(|&i| members[0][i].clone()).collect();
            if targets.is_empty() {
                out.push(Value::Number(members.len() as f64));
            } else {
                out.extend(targets.iter().map(|t| compute(members, t)));
            }
            out
        })
        .collect();

    Ok((columns, output))
}

fn resolve_targets(
    spec: &QuerySpec,
    schema: &DatasetSchema,
    dataset: &Dataset,
) -> Result<Vec<Target>> {
    spec.aggregations
        .iter()
        .map(|(column, &function)| {
            if !schema.supports_aggregation(function) {
                return Err(execution_error(format!(
                    "aggregation '{}' is not supported",
                    function
                )));
            }
            let column_type = schema.column_type(column).ok_or_else(|| {
                execution_error(format!("unknown aggregation target '{}'", column))
            })?;
            if function.requires_numeric() && !column_type.is_numeric() {
                return Err(execution_error(format!(
                    "'{}' needs a numeric column, but '{}' is {}",
                    function, column, column_type
                )));
            }
            if spec.group_by.contains(column) {
                return Err(execution_error(format!(
                    "'{}' cannot be both a group_by key and an aggregation target",
                    column
                )));
            }
            let index = dataset.column_index(column).ok_or_else(|| {
                execution_error(format!("column '{}' is not present in the dataset", column))
            })?;
            Ok(Target { index, function })
        })
        .collect()
}

/// Apply one aggregation over a group, ignoring nulls.
fn compute(members: &[&Vec<Value>], target: &Target) -> Value {
    let values = members
        .iter()
        .map(|row| &row[target.index])
        .filter(|v| !v.is_null());

    match target.function {
        AggregateFn::Count => Value::Number(values.count() as f64),
        AggregateFn::Sum => Value::Number(values.filter_map(Value::as_f64).sum()),
        AggregateFn::Mean => {
            let (sum, n) = values
                .filter_map(Value::as_f64)
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n == 0 {
                Value::Null
            } else {
                Value::Number(sum / n as f64)
            }
        }
        AggregateFn::Min => values.min_by(|a, b| a.total_cmp(b)).cloned().unwrap_or(Value::Null),
        AggregateFn::Max => values.max_by(|a, b| a.total_cmp(b)).cloned().unwrap_or(Value::Null),
    }
}
