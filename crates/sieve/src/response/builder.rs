//! Assembly of the user-facing response payload.

use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use super::statistics::ResultStatistics;
use crate::censor::{CensorKind, CensoringService};
use crate::engine::ExecutionResult;
use crate::error::{FieldViolation, Result, SieveError};
use crate::input::Value;
use crate::schema::{AggregateFn, DatasetSchema};
use crate::spec::QuerySpec;

/// Longest text cell surfaced verbatim in a source record.
const PREVIEW_CHARS: usize = 100;

/// A censored result row as exposed to callers.
pub type SourceRecord = IndexMap<String, Value>;

/// How much the answer can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Rows matched a filtered or grouped question.
    High,
    /// Rows matched, but nothing narrowed them down.
    Medium,
    /// The question ran but matched nothing.
    Low,
    /// The question could not be answered.
    None,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::None => "none",
        }
    }

    fn assess(spec: &QuerySpec, result: &ExecutionResult) -> Self {
        if result.is_empty() {
            Confidence::Low
        } else if !spec.filters.is_empty() || spec.is_aggregate() {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }
}

/// Error details carried by a failed response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    /// Stable tag, e.g. `parse_error`.
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl From<&SieveError> for ResponseError {
    fn from(err: &SieveError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            violations: err.violations().to_vec(),
        }
    }
}

/// The payload returned for every question, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRecord>,
    pub confidence: Confidence,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// The resolved specification that was executed.
    pub query_spec: Option<QuerySpec>,
    pub statistics: Option<ResultStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Censors and summarizes execution results for one schema.
pub struct ResponseBuilder<'a> {
    schema: &'a DatasetSchema,
    censor: &'a CensoringService,
}

impl<'a> ResponseBuilder<'a> {
    pub fn new(schema: &'a DatasetSchema, censor: &'a CensoringService) -> Self {
        Self { schema, censor }
    }

    /// Build a response from the outcome of parsing and executing a question.
    ///
    /// Every error is folded into a well-formed failure payload.
    pub fn build(&self, question: &str, outcome: Result<(QuerySpec, ExecutionResult)>) -> QueryResponse {
        match outcome {
            Ok((spec, result)) => self.success(question, spec, &result),
            Err(err) => self.failure(question, &err, None),
        }
    }

    /// Build the response for an executed specification.
    pub fn success(&self, question: &str, spec: QuerySpec, result: &ExecutionResult) -> QueryResponse {
        let shown = result.len().min(self.schema.sources_limit);
        let statistics = ResultStatistics::compute(result, shown, self.schema);

        let kinds = self.output_censor_kinds(&spec, result);
        let sources: Vec<SourceRecord> = result
            .rows
            .iter()
            .take(shown)
            .map(|row| self.censor_row(row, &kinds))
            .collect();

        let confidence = Confidence::assess(&spec, result);
        let answer = render_answer(&spec, result, &sources);

        info!(
            rows = result.len(),
            total_rows = result.total_rows,
            sources = sources.len(),
            confidence = confidence.as_str(),
            "question answered"
        );

        QueryResponse {
            question: question.to_string(),
            answer,
            sources,
            confidence,
            timestamp: Utc::now().to_rfc3339(),
            query_spec: Some(spec),
            statistics: Some(statistics),
            error: None,
        }
    }

    /// Build the response for a question that could not be answered.
    pub fn failure(&self, question: &str, error: &SieveError, spec: Option<QuerySpec>) -> QueryResponse {
        warn!(kind = error.kind(), error = %error, "question failed");

        QueryResponse {
            question: question.to_string(),
            answer: format!("Error: the question could not be answered ({}).", error.kind()),
            sources: Vec::new(),
            confidence: Confidence::None,
            timestamp: Utc::now().to_rfc3339(),
            query_spec: spec,
            statistics: None,
            error: Some(ResponseError::from(error)),
        }
    }

    /// Censor kind for each output column.
    ///
    /// Counts, sums and means of a sensitive column are derived figures and are
    /// left as is; group keys and min/max of one are real values.
    fn output_censor_kinds(&self, spec: &QuerySpec, result: &ExecutionResult) -> IndexMap<String, CensorKind> {
        let sensitive = self.schema.sensitive_columns();
        result
            .columns
            .iter()
            .filter(|column| {
                !matches!(
                    spec.aggregations.get(column.as_str()),
                    Some(AggregateFn::Count | AggregateFn::Sum | AggregateFn::Mean)
                )
            })
            .filter_map(|column| {
                sensitive
                    .get(column.as_str())
                    .map(|kind| (column.clone(), *kind))
            })
            .collect()
    }

    fn censor_row(&self, row: &IndexMap<String, Value>, kinds: &IndexMap<String, CensorKind>) -> SourceRecord {
        row.iter()
            .map(|(column, value)| {
                let out = match (kinds.get(column), value) {
                    (_, Value::Null) => Value::Null,
                    (Some(kind), value) => Value::Text(self.censor.censor_value(value, *kind)),
                    (None, Value::Text(text)) => Value::Text(preview(text)),
                    (None, value) => value.clone(),
                };
                (column.clone(), out)
            })
            .collect()
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Plain-language summary of a result, drawn from the censored sources.
fn render_answer(spec: &QuerySpec, result: &ExecutionResult, sources: &[SourceRecord]) -> String {
    if result.is_empty() {
        return "No matching rows were found for this question.".to_string();
    }

    let noun = match (spec.is_aggregate(), result.total_rows) {
        (true, 1) => "group",
        (true, _) => "groups",
        (false, 1) => "matching row",
        (false, _) => "matching rows",
    };
    let mut answer = format!("Found {} {}", result.total_rows, noun);
    if result.truncated() {
        answer.push_str(&format!(", returning the first {}", result.len()));
    }
    answer.push('.');

    if let [only] = sources {
        let fields: Vec<String> = only
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect();
        answer.push(' ');
        answer.push_str(&fields.join(", "));
        answer.push('.');
    } else if sources.len() < result.len() {
        answer.push_str(&format!(" Showing {} of them.", sources.len()));
    }

    answer
}
