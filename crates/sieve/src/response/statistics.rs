//! Summary statistics over an uncensored execution result.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::engine::ExecutionResult;
use crate::input::Value;
use crate::schema::DatasetSchema;

/// Running numeric summary for one column.
#[derive(Debug, Clone)]
struct NumericAccumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl NumericAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self) -> Option<NumericSummary> {
        (self.count > 0).then(|| NumericSummary {
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
        })
    }
}

/// Range and mean of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Per-column statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    /// Distinct non-null values.
    pub distinct: usize,
    pub nulls: usize,
    /// Present only when every non-null value is numeric and the column is
    /// not sensitive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Statistics for a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultStatistics {
    /// Rows matched before the limit.
    pub total_rows: usize,
    /// Rows returned by execution, after the limit.
    pub rows_returned: usize,
    /// Rows surfaced as sources.
    pub rows_shown: usize,
    pub columns: IndexMap<String, ColumnStatistics>,
}

impl ResultStatistics {
    /// Compute statistics over the returned rows.
    ///
    /// Must run before censoring: distinct counts describe the real values.
    /// Sensitive columns keep their counts but never report a numeric range.
    pub fn compute(result: &ExecutionResult, rows_shown: usize, schema: &DatasetSchema) -> Self {
        let sensitive = schema.sensitive_columns();
        let columns = result
            .columns
            .iter()
            .map(|name| {
                let mut stats = column_statistics(result.column_values(name));
                if sensitive.contains_key(name.as_str()) {
                    stats.numeric = None;
                }
                (name.clone(), stats)
            })
            .collect();

        Self {
            total_rows: result.total_rows,
            rows_returned: result.rows.len(),
            rows_shown,
            columns,
        }
    }
}

pub(crate) fn column_statistics<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnStatistics {
    let mut seen: HashSet<String> = HashSet::new();
    let mut nulls = 0;
    let mut numeric = NumericAccumulator::new();
    let mut all_numeric = true;

    for value in values {
        match value {
            Value::Null => nulls += 1,
            Value::Number(n) => {
                numeric.add(*n);
                seen.insert(value.to_string());
            }
            other => {
                all_numeric = false;
                seen.insert(other.to_string());
            }
        }
    }

    ColumnStatistics {
        distinct: seen.len(),
        nulls,
        numeric: if all_numeric { numeric.finish() } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::censor::CensorKind;
    use crate::engine::Row;
    use crate::schema::ColumnSchema;

    fn schema() -> DatasetSchema {
        DatasetSchema::with_columns(vec![ColumnSchema::text("BRAND"), ColumnSchema::numeric("PRICE")])
    }

    fn result() -> ExecutionResult {
        let rows: Vec<Row> = [
            ("Samsung", Value::Number(1200.0)),
            ("LG", Value::Number(800.0)),
            ("Samsung", Value::Null),
        ]
        .into_iter()
        .map(|(brand, price)| {
            let mut row = Row::new();
            row.insert("BRAND".into(), Value::from(brand));
            row.insert("PRICE".into(), price);
            row
        })
        .collect();

        ExecutionResult {
            columns: vec!["BRAND".into(), "PRICE".into()],
            rows,
            total_rows: 7,
            limit: 3,
        }
    }

    #[test]
    fn test_column_statistics() {
        let stats = ResultStatistics::compute(&result(), 2, &schema());

        assert_eq!(stats.total_rows, 7);
        assert_eq!(stats.rows_returned, 3);
        assert_eq!(stats.rows_shown, 2);

        let brand = &stats.columns["BRAND"];
        assert_eq!(brand.distinct, 2);
        assert!(brand.numeric.is_none());

        let price = &stats.columns["PRICE"];
        assert_eq!(price.nulls, 1);
        let summary = price.numeric.as_ref().unwrap();
        assert_eq!(summary.min, 800.0);
        assert_eq!(summary.max, 1200.0);
        assert_eq!(summary.mean, 1000.0);
    }

    #[test]
    fn test_sensitive_numeric_column_has_no_range() {
        let schema = DatasetSchema::with_columns(vec![
            ColumnSchema::text("BRAND"),
            ColumnSchema::numeric("PRICE").censored(CensorKind::Identifier),
        ]);
        let stats = ResultStatistics::compute(&result(), 3, &schema);

        let price = &stats.columns["PRICE"];
        assert!(price.numeric.is_none());
        assert_eq!(price.distinct, 2);
        assert_eq!(price.nulls, 1);
    }
}
