//! Typed query specification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{AggregateFn, FilterOp, SortOrder};

/// Operand of a filter clause; its shape depends on the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Two-element inclusive bound for `date_range`.
    Range(serde_json::Value, serde_json::Value),
    /// Candidate set for `in`.
    List(Vec<serde_json::Value>),
    /// Single operand for every other operator.
    Scalar(serde_json::Value),
}

/// One column/operator/value triple, ANDed with its peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    pub by: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// A validated query specification with every default resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Projected columns, in output order.
    pub select: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,
    /// Resolved row limit.
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub aggregations: IndexMap<String, AggregateFn>,
}

impl QuerySpec {
    /// Whether the specification partitions or summarizes rows rather than selecting them.
    pub fn is_aggregate(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregations.is_empty()
    }

    /// Every column the specification reads from the dataset.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.select
            .iter()
            .chain(self.filters.iter().map(|f| &f.column))
            .chain(self.sort.iter().map(|s| &s.by))
            .chain(self.group_by.iter())
            .map(|s| s.as_str())
    }
}
