//! In-memory dataset and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::schema::{ColumnType, DatasetSchema};

/// Metadata about the file a dataset was loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the dataset was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Immutable, typed tabular snapshot.
///
/// Rows are stored row-major; every row has exactly one value per header.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
    index: IndexMap<String, usize>,
}

impl Dataset {
    /// Create a dataset, padding short rows with nulls and truncating long ones.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        Self {
            headers,
            rows,
            index,
        }
    }

    /// Build a dataset from raw text cells, typing each column from the schema.
    ///
    /// Columns the schema does not know about are kept as text.
    pub fn from_text_rows<S: AsRef<str>>(
        schema: &DatasetSchema,
        headers: &[S],
        rows: &[Vec<S>],
    ) -> Self {
        let types: Vec<ColumnType> = headers
            .iter()
            .map(|h| schema.column_type(h.as_ref()).unwrap_or(ColumnType::Text))
            .collect();

        let typed = rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&types)
                    .map(|(cell, ty)| Value::parse_cell(cell.as_ref(), *ty))
                    .collect()
            })
            .collect();

        Self::new(
            headers.iter().map(|h| h.as_ref().to_string()).collect(),
            typed,
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of distinct non-null values in a column.
    pub fn distinct_count(&self, name: &str) -> Option<usize> {
        let index = self.column_index(name)?;
        let mut seen: Vec<String> = self
            .column_values(index)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        Some(seen.len())
    }
}
