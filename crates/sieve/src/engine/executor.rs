//! Specification execution over an in-memory dataset.

use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::aggregate::aggregate;
use super::execution_error;
use super::filter::CompiledFilter;
use super::sort::{resolve_keys, sort_rows};
use crate::error::Result;
use crate::input::{Dataset, Value};
use crate::schema::DatasetSchema;
use crate::spec::QuerySpec;

/// One output row, keyed by column name in output order.
pub type Row = IndexMap<String, Value>;

/// Rows produced by executing a specification.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Output columns, in order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Rows (or groups) available before the limit was applied.
    pub total_rows: usize,
    /// Limit that was applied.
    pub limit: usize,
}

impl ExecutionResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the limit cut rows off.
    pub fn truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    /// Values of one output column, top to bottom.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().filter_map(move |row| row.get(name))
    }
}

/// Executes validated specifications. Stateless; the dataset is never mutated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionEngine;

impl ExecutionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run `spec` against `dataset`.
    ///
    /// Filters are ANDed. Aggregating specifications then group and summarize;
    /// others are sorted on the full rows before projection so they may sort by
    /// a column they do not select. The limit is applied last.
    pub fn execute(
        &self,
        spec: &QuerySpec,
        dataset: &Dataset,
        schema: &DatasetSchema,
    ) -> Result<ExecutionResult> {
        let start = Instant::now();

        let filters = spec
            .filters
            .iter()
            .map(|clause| CompiledFilter::compile(clause, schema, dataset))
            .collect::<Result<Vec<_>>>()?;

        let matched: Vec<&Vec<Value>> = dataset
            .rows()
            .iter()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
            .collect();

        debug!(
            total = dataset.row_count(),
            matched = matched.len(),
            filters = filters.len(),
            "filters applied"
        );

        let result = if spec.is_aggregate() {
            Self::run_aggregate(spec, schema, dataset, &matched)?
        } else {
            Self::run_select(spec, dataset, matched)?
        };

        debug!(
            rows = result.rows.len(),
            total_rows = result.total_rows,
            elapsed_us = start.elapsed().as_micros() as u64,
            "specification executed"
        );

        Ok(result)
    }

    fn run_select(
        spec: &QuerySpec,
        dataset: &Dataset,
        mut matched: Vec<&Vec<Value>>,
    ) -> Result<ExecutionResult> {
        let keys = resolve_keys(&spec.sort, dataset.headers())?;
        sort_rows(&mut matched, &keys);

        let projection = spec
            .select
            .iter()
            .map(|name| {
                dataset
                    .column_index(name)
                    .map(|i| (name.as_str(), i))
                    .ok_or_else(|| {
                        execution_error(format!("column '{}' is not present in the dataset", name))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let total_rows = matched.len();
        let rows = matched
            .into_iter()
            .take(spec.limit)
            .map(|row| {
                projection
                    .iter()
                    .map(|&(name, i)| (name.to_string(), row[i].clone()))
                    .collect()
            })
            .collect();

        Ok(ExecutionResult {
            columns: spec.select.clone(),
            rows,
            total_rows,
            limit: spec.limit,
        })
    }

    fn run_aggregate(
        spec: &QuerySpec,
        schema: &DatasetSchema,
        dataset: &Dataset,
        matched: &[&Vec<Value>],
    ) -> Result<ExecutionResult> {
        let (columns, mut rows) = aggregate(matched, spec, schema, dataset)?;

        let keys = resolve_keys(&spec.sort, &columns)?;
        sort_rows(&mut rows, &keys);

        let total_rows = rows.len();
        let rows = rows
            .into_iter()
            .take(spec.limit)
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect();

        Ok(ExecutionResult {
            columns,
            rows,
            total_rows,
            limit: spec.limit,
        })
    }
}
