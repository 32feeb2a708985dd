//! Error types for the Sieve library.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed specification validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path of the offending field (e.g. `select`, `filters[1].op`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Main error type for Sieve operations.
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error outside of specification parsing.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Specification text is not well-formed.
    #[error("Parse error: {message} (input: {excerpt:?})")]
    Parse { message: String, excerpt: String },

    /// Specification is well-formed but violates the schema.
    #[error("Validation error: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// A valid specification could not be executed against the data.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown or inconsistent profile.
    #[error("Profile error: {0}")]
    Profile(String),

    /// Failure talking to a language model.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl SieveError {
    /// Stable snake-case tag for the error kind, used in response payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SieveError::Io { .. } => "io_error",
            SieveError::Csv(_) => "csv_error",
            SieveError::Json(_) => "json_error",
            SieveError::Parse { .. } => "parse_error",
            SieveError::Validation(_) => "validation_error",
            SieveError::Execution(_) => "execution_error",
            SieveError::Config(_) => "config_error",
            SieveError::Profile(_) => "profile_error",
            SieveError::Llm(_) => "llm_error",
            SieveError::EmptyData(_) => "empty_data",
        }
    }

    /// Field violations carried by a validation error, empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SieveError::Validation(v) => v,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for Sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
