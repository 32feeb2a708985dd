//! Parsing and schema validation of raw specification text.
//!
//! Validation is total: every field is checked and every violation is
//! reported, so the caller (or the language model being re-prompted) gets
//! the complete diagnostic in one pass.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::debug;

use super::query::{FilterClause, FilterValue, QuerySpec, SortClause};
use crate::error::{FieldViolation, Result, SieveError};
use crate::schema::{AggregateFn, DatasetSchema, FilterOp, SortOrder};

/// Maximum characters of offending input quoted in a parse error.
const EXCERPT_CHARS: usize = 200;

const KNOWN_KEYS: &[&str] = &["select", "filters", "sort", "limit", "group_by", "aggregations"];

/// Turns raw text into a [`QuerySpec`] checked against one schema.
pub struct SpecParser<'a> {
    schema: &'a DatasetSchema,
}

impl<'a> SpecParser<'a> {
    pub fn new(schema: &'a DatasetSchema) -> Self {
        Self { schema }
    }

    /// Parse and validate specification text.
    ///
    /// Text wrapped in a markdown code fence is unwrapped first.
    pub fn parse(&self, text: &str) -> Result<QuerySpec> {
        let body = extract_json(text);
        let json: Json = serde_json::from_str(body).map_err(|e| SieveError::Parse {
            message: e.to_string(),
            excerpt: excerpt(text),
        })?;
        self.validate(&json)
    }

    /// Validate an already-parsed JSON value.
    pub fn validate(&self, json: &Json) -> Result<QuerySpec> {
        let Some(obj) = json.as_object() else {
            return Err(SieveError::Validation(vec![FieldViolation::new(
                "spec",
                "must be a JSON object",
            )]));
        };

        for key in obj.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            debug!(key = %key, "ignoring unknown specification key");
        }

        let mut violations = Vec::new();

        let select = self.check_select(obj, &mut violations);
        let filters = self.check_filters(obj, &mut violations);
        let sort = self.check_sort(obj, &mut violations);
        let limit = self.check_limit(obj, &mut violations);
        let group_by = self.check_group_by(obj, &mut violations);
        let aggregations = self.check_aggregations(obj, &mut violations);

        if !violations.is_empty() {
            debug!(count = violations.len(), "specification rejected");
            return Err(SieveError::Validation(violations));
        }

        Ok(QuerySpec {
            select,
            filters,
            sort,
            limit,
            group_by,
            aggregations,
        })
    }

    fn all_columns(&self) -> Vec<String> {
        self.schema.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Check a column reference, recording a violation if it is not allowed.
    fn check_column(
        &self,
        field: String,
        value: Option<&Json>,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<String> {
        match value {
            Some(Json::String(name)) if self.schema.has_column(name) => Some(name.clone()),
            Some(Json::String(name)) => {
                violations.push(FieldViolation::new(
                    field,
                    format!("unknown column '{}'", name),
                ));
                None
            }
            Some(_) => {
                violations.push(FieldViolation::new(field, "must be a column name string"));
                None
            }
            None => {
                violations.push(FieldViolation::new(field, "is required"));
                None
            }
        }
    }

    fn check_column_list(
        &self,
        field: &str,
        items: &[Json],
        violations: &mut Vec<FieldViolation>,
    ) -> Vec<String> {
        let mut columns: Vec<String> = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", field, i);
            if let Some(name) = self.check_column(path.clone(), Some(item), violations) {
                if columns.contains(&name) {
                    violations.push(FieldViolation::new(
                        path,
                        format!("duplicate column '{}'", name),
                    ));
                } else {
                    columns.push(name);
                }
            }
        }
        columns
    }

    fn check_select(&self, obj: &Map<String, Json>, violations: &mut Vec<FieldViolation>) -> Vec<String> {
        match obj.get("select") {
            None | Some(Json::Null) => self.all_columns(),
            Some(Json::Array(items)) if items.is_empty() => self.all_columns(),
            Some(Json::Array(items)) => self.check_column_list("select", items, violations),
            Some(_) => {
                violations.push(FieldViolation::new("select", "must be a list of column names"));
                Vec::new()
            }
        }
    }

    fn check_filters(
        &self,
        obj: &Map<String, Json>,
        violations: &mut Vec<FieldViolation>,
    ) -> Vec<FilterClause> {
        let items = match obj.get("filters") {
            None | Some(Json::Null) => return Vec::new(),
            Some(Json::Array(items)) => items,
            Some(_) => {
                violations.push(FieldViolation::new("filters", "must be a list of filter objects"));
                return Vec::new();
            }
        };

        let mut filters = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(clause) = item.as_object() else {
                violations.push(FieldViolation::new(
                    format!("filters[{}]", i),
                    "must be an object with column, op and value",
                ));
                continue;
            };

            let column = self.check_column(
                format!("filters[{}].column", i),
                clause.get("column"),
                violations,
            );
            let op = self.check_filter_op(i, clause.get("op"), violations);
            let value = op.and_then(|op| check_filter_value(i, op, clause.get("value"), violations));

            if let (Some(column), Some(op), Some(value)) = (column, op, value) {
                filters.push(FilterClause { column, op, value });
            }
        }
        filters
    }

    fn check_filter_op(
        &self,
        index: usize,
        value: Option<&Json>,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<FilterOp> {
        let field = format!("filters[{}].op", index);
        let Some(name) = value.and_then(Json::as_str) else {
            violations.push(FieldViolation::new(field, "must be an operator name string"));
            return None;
        };
        match name.parse::<FilterOp>() {
            Ok(op) if self.schema.supports_op(op) => Some(op),
            Ok(op) => {
                violations.push(FieldViolation::new(
                    field,
                    format!("operator '{}' is not supported for this dataset", op),
                ));
                None
            }
            Err(e) => {
                violations.push(FieldViolation::new(field, e));
                None
            }
        }
    }

    fn check_sort(&self, obj: &Map<String, Json>, violations: &mut Vec<FieldViolation>) -> Vec<SortClause> {
        let items = match obj.get("sort") {
            None | Some(Json::Null) => return Vec::new(),
            Some(Json::Array(items)) => items,
            Some(_) => {
                violations.push(FieldViolation::new("sort", "must be a list of sort objects"));
                return Vec::new();
            }
        };

        let mut sort = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(clause) = item.as_object() else {
                violations.push(FieldViolation::new(
                    format!("sort[{}]", i),
                    "must be an object with by and order",
                ));
                continue;
            };

            let by = self.check_column(format!("sort[{}].by", i), clause.get("by"), violations);
            let order_field = format!("sort[{}].order", i);
            let order = match clause.get("order") {
                None | Some(Json::Null) => Some(SortOrder::Asc),
                Some(Json::String(s)) => match s.parse::<SortOrder>() {
                    Ok(order) if self.schema.supports_sort_order(order) => Some(order),
                    Ok(order) => {
                        violations.push(FieldViolation::new(
                            order_field,
                            format!("order '{}' is not supported", order.as_str()),
                        ));
                        None
                    }
                    Err(e) => {
                        violations.push(FieldViolation::new(order_field, e));
                        None
                    }
                },
                Some(_) => {
                    violations.push(FieldViolation::new(order_field, "must be 'asc' or 'desc'"));
                    None
                }
            };

            if let (Some(by), Some(order)) = (by, order) {
                sort.push(SortClause { by, order });
            }
        }
        sort
    }

    fn check_limit(&self, obj: &Map<String, Json>, violations: &mut Vec<FieldViolation>) -> usize {
        let requested = match obj.get("limit") {
            None | Some(Json::Null) => None,
            Some(Json::Number(n)) => {
                let as_int = n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
                match as_int {
                    Some(v) if v >= 1 => Some(v as usize),
                    Some(_) => {
                        violations.push(FieldViolation::new("limit", "must be a positive integer"));
                        None
                    }
                    None => {
                        violations.push(FieldViolation::new("limit", "must be an integer"));
                        None
                    }
                }
            }
            Some(_) => {
                violations.push(FieldViolation::new("limit", "must be a positive integer"));
                None
            }
        };

        let limit = self.schema.resolve_limit(requested);
        if let Some(requested) = requested {
            if requested > limit {
                debug!(requested, applied = limit, "limit clamped to schema maximum");
            }
        }
        limit
    }

    fn check_group_by(&self, obj: &Map<String, Json>, violations: &mut Vec<FieldViolation>) -> Vec<String> {
        match obj.get("group_by") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => self.check_column_list("group_by", items, violations),
            Some(_) => {
                violations.push(FieldViolation::new("group_by", "must be a list of column names"));
                Vec::new()
            }
        }
    }

    fn check_aggregations(
        &self,
        obj: &Map<String, Json>,
        violations: &mut Vec<FieldViolation>,
    ) -> IndexMap<String, AggregateFn> {
        let entries = match obj.get("aggregations") {
            None | Some(Json::Null) => return IndexMap::new(),
            Some(Json::Object(entries)) => entries,
            Some(_) => {
                violations.push(FieldViolation::new(
                    "aggregations",
                    "must be an object mapping column to function",
                ));
                return IndexMap::new();
            }
        };

        let mut aggregations = IndexMap::with_capacity(entries.len());
        for (column, function) in entries {
            let field = format!("aggregations.{}", column);
            let Some(name) = function.as_str() else {
                violations.push(FieldViolation::new(field, "must be a function name string"));
                continue;
            };
            match name.parse::<AggregateFn>() {
                Ok(f) if self.schema.supports_aggregation(f) => {
                    aggregations.insert(column.clone(), f);
                }
                Ok(f) => violations.push(FieldViolation::new(
                    field,
                    format!("function '{}' is not supported for this dataset", f),
                )),
                Err(e) => violations.push(FieldViolation::new(field, e)),
            }
        }
        aggregations
    }
}

/// Check the operand shape required by an operator.
fn check_filter_value(
    index: usize,
    op: FilterOp,
    value: Option<&Json>,
    violations: &mut Vec<FieldViolation>,
) -> Option<FilterValue> {
    let field = format!("filters[{}].value", index);
    let Some(value) = value.filter(|v| !v.is_null()) else {
        violations.push(FieldViolation::new(field, "is required"));
        return None;
    };

    match op {
        FilterOp::In => match value {
            Json::Array(items) if !items.is_empty() => Some(FilterValue::List(items.clone())),
            _ => {
                violations.push(FieldViolation::new(field, "must be a non-empty list for 'in'"));
                None
            }
        },
        FilterOp::DateRange => match value {
            Json::Array(bounds) if bounds.len() == 2 => {
                Some(FilterValue::Range(bounds[0].clone(), bounds[1].clone()))
            }
            Json::Object(bounds) if bounds.contains_key("start") && bounds.contains_key("end") => {
                Some(FilterValue::Range(bounds["start"].clone(), bounds["end"].clone()))
            }
            _ => {
                violations.push(FieldViolation::new(
                    field,
                    "must be a two-element [start, end] list for 'date_range'",
                ));
                None
            }
        },
        _ => match value {
            Json::Array(_) | Json::Object(_) => {
                violations.push(FieldViolation::new(
                    field,
                    format!("must be a single value for '{}'", op),
                ));
                None
            }
            scalar => Some(FilterValue::Scalar(scalar.clone())),
        },
    }
}

/// Strip a markdown code fence if the model wrapped its answer in one.
fn extract_json(text: &str) -> &str {
    if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(text)
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(text)
    } else {
        text.trim()
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
