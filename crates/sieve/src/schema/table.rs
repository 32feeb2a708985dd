//! Dataset-level schema: allowed columns plus the supported query vocabulary.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::ColumnSchema;
use super::types::{AggregateFn, ColumnType, FilterOp, SortOrder};
use crate::censor::CensorKind;

/// Row limit applied when a specification does not request one.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Hard upper bound on the rows a specification may request.
pub const MAX_QUERY_LIMIT: usize = 500;

/// Number of result rows surfaced as sources in a response.
pub const DEFAULT_SOURCES_LIMIT: usize = 20;

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn max_limit() -> usize {
    MAX_QUERY_LIMIT
}

fn sources_limit() -> usize {
    DEFAULT_SOURCES_LIMIT
}

fn all_filter_ops() -> Vec<FilterOp> {
    FilterOp::ALL.to_vec()
}

fn all_aggregations() -> Vec<AggregateFn> {
    AggregateFn::ALL.to_vec()
}

fn all_sort_orders() -> Vec<SortOrder> {
    vec![SortOrder::Asc, SortOrder::Desc]
}

/// Schema for an entire dataset.
///
/// Read-only to the query engine: it is built once by a profile and shared
/// by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Allowed columns, in display order.
    pub columns: Vec<ColumnSchema>,
    /// Limit used when a specification omits one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Largest limit a specification may resolve to.
    #[serde(default = "max_limit")]
    pub max_limit: usize,
    /// Presentation cap on rows returned as sources.
    #[serde(default = "sources_limit")]
    pub sources_limit: usize,
    /// Filter operators a specification may use.
    #[serde(default = "all_filter_ops")]
    pub filter_ops: Vec<FilterOp>,
    /// Aggregation functions a specification may use.
    #[serde(default = "all_aggregations")]
    pub aggregations: Vec<AggregateFn>,
    /// Sort directions a specification may use.
    #[serde(default = "all_sort_orders")]
    pub sort_orders: Vec<SortOrder>,
}

impl DatasetSchema {
    /// Create a schema with the given columns and the default query vocabulary.
    pub fn with_columns(columns: Vec<ColumnSchema>) -> Self {
        Self {
            columns,
            default_limit: DEFAULT_QUERY_LIMIT,
            max_limit: MAX_QUERY_LIMIT,
            sources_limit: DEFAULT_SOURCES_LIMIT,
            filter_ops: all_filter_ops(),
            aggregations: all_aggregations(),
            sort_orders: all_sort_orders(),
        }
    }

    /// Override the default and maximum query limits.
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    /// Override the presentation cap.
    pub fn with_sources_limit(mut self, limit: usize) -> Self {
        self.sources_limit = limit;
        self
    }

    /// Restrict the filter operators a specification may use.
    pub fn with_filter_ops(mut self, ops: Vec<FilterOp>) -> Self {
        self.filter_ops = ops;
        self
    }

    /// Restrict the aggregation functions a specification may use.
    pub fn with_aggregations(mut self, functions: Vec<AggregateFn>) -> Self {
        self.aggregations = functions;
        self
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check whether `name` is one of the allowed columns.
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Declared type of a column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.get_column(name).map(|c| c.column_type)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Map of sensitive column name to the censoring it requires.
    pub fn sensitive_columns(&self) -> IndexMap<&str, CensorKind> {
        self.columns
            .iter()
            .filter_map(|c| c.censor.map(|kind| (c.name.as_str(), kind)))
            .collect()
    }

    pub fn supports_op(&self, op: FilterOp) -> bool {
        self.filter_ops.contains(&op)
    }

    pub fn supports_aggregation(&self, function: AggregateFn) -> bool {
        self.aggregations.contains(&function)
    }

    pub fn supports_sort_order(&self, order: SortOrder) -> bool {
        self.sort_orders.contains(&order)
    }

    /// Resolve a requested limit against the configured default and maximum.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}
