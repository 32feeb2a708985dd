//! Dataset profiles: a schema plus the prompt material that goes with it.
//!
//! Built-in profiles live in a static registry keyed by name. Profiles can
//! also be loaded from JSON files with the same shape as [`Profile`].

mod fridge;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SieveError};
use crate::input::Dataset;
use crate::schema::DatasetSchema;

pub use fridge::default_profile;

/// Sample rows included in a prompt by default.
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

fn default_sample_rows() -> usize {
    DEFAULT_SAMPLE_ROWS
}

fn default_language() -> String {
    "en-US".to_string()
}

/// Built-in profiles, by name.
const BUILTIN: &[(&str, fn() -> Profile)] = &[(fridge::NAME, default_profile)];

/// Everything needed to ask questions about one kind of dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub schema: DatasetSchema,
    /// System prompt for specification generation.
    pub system_prompt: String,
    /// Extra guidance lines appended to the schema hints.
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub example_queries: Vec<String>,
    /// Statistic label to column, for dataset summaries.
    #[serde(default)]
    pub stats_columns: IndexMap<String, String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub terminology: IndexMap<String, String>,
    /// Data file used when none is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Profile {
    /// Look up a built-in profile. Unknown names are an error.
    pub fn builtin(name: &str) -> Result<Self> {
        BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, build)| build())
            .ok_or_else(|| {
                SieveError::Profile(format!(
                    "unknown profile '{}' (available: {})",
                    name,
                    builtin_names().join(", ")
                ))
            })
    }

    /// Resolve a profile by built-in name or, for `.json` paths, from a file.
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
            Self::from_json_file(path)
        } else {
            Self::builtin(name_or_path)
        }
    }

    /// Load a profile from a JSON file.
    ///
    /// Unknown censoring tags and unknown column types fail here.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
            .map_err(|e| SieveError::Profile(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let profile: Profile =
            serde_json::from_str(text).map_err(|e| SieveError::Profile(e.to_string()))?;
        profile.check()?;
        debug!(profile = %profile.name, columns = profile.schema.column_count(), "profile loaded");
        Ok(profile)
    }

    /// Internal consistency: columns named by statistics must exist, limits must be sane.
    fn check(&self) -> Result<()> {
        if self.schema.columns.is_empty() {
            return Err(SieveError::Profile(format!("profile '{}' declares no columns", self.name)));
        }
        if self.schema.default_limit == 0 || self.schema.default_limit > self.schema.max_limit {
            return Err(SieveError::Profile(format!(
                "profile '{}': default limit {} must be between 1 and max limit {}",
                self.name, self.schema.default_limit, self.schema.max_limit
            )));
        }
        if let Some((label, column)) = self
            .stats_columns
            .iter()
            .find(|(_, column)| !self.schema.has_column(column))
        {
            return Err(SieveError::Profile(format!(
                "profile '{}': statistic '{}' names unknown column '{}'",
                self.name, label, column
            )));
        }
        Ok(())
    }

    /// Required columns missing from a dataset.
    pub fn validate_columns(&self, dataset: &Dataset) -> Vec<String> {
        self.schema
            .columns
            .iter()
            .filter(|c| dataset.column_index(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Fail if the dataset lacks any required column.
    pub fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        let missing = self.validate_columns(dataset);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SieveError::Profile(format!(
                "dataset is missing required columns for '{}': {}",
                self.name,
                missing.join(", ")
            )))
        }
    }

    /// Schema description for the specification prompt, with `sample` embedded.
    pub fn schema_hints(&self, sample: &str) -> String {
        let schema = &self.schema;
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.column_type))
            .collect();
        let ops: Vec<&str> = schema.filter_ops.iter().map(|op| op.as_str()).collect();
        let aggregations: Vec<&str> = schema.aggregations.iter().map(|f| f.as_str()).collect();

        let mut out = String::new();
        out.push_str(&format!("Allowed columns: {}.\n", columns.join(", ")));
        out.push_str(&format!("Allowed filter ops: {}.\n", ops.join(", ")));
        out.push_str(&format!("Allowed aggregations: {}.\n", aggregations.join(", ")));
        out.push_str(&format!(
            "The limit must be <= {}. Default to {} if unspecified.\n",
            schema.max_limit, schema.default_limit
        ));
        out.push_str("Context of the dataframe:\n");
        out.push_str(sample);
        if !sample.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("Prompt hints for JSON spec creation:\n");
        for hint in &self.hints {
            out.push_str(&format!("- {}\n", hint));
        }
        out.push_str("- Always return only the JSON object, no explanations or markdown.\n");
        out
    }
}

/// Names of every built-in profile.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::censor::CensorKind;
    use crate::schema::ColumnType;

    #[test]
    fn test_default_profile_schema() {
        let profile = Profile::builtin("default_profile").unwrap();
        let sensitive = profile.schema.sensitive_columns();

        assert_eq!(profile.schema.column_count(), 11);
        assert_eq!(sensitive.get("CUSTOMER_ID"), Some(&CensorKind::Identifier));
        assert_eq!(sensitive.get("STORE_ADDRESS"), Some(&CensorKind::Address));
        assert_eq!(profile.schema.column_type("SALES_DATE"), Some(ColumnType::Date));
        assert_eq!(profile.schema.default_limit, 100);
        assert_eq!(profile.schema.max_limit, 500);
        assert!(profile.check().is_ok());
    }

    #[test]
    fn test_unknown_profile_is_error() {
        let err = Profile::builtin("vehicle_sales").unwrap_err();
        assert_eq!(err.kind(), "profile_error");
        assert!(err.to_string().contains("default_profile"));
    }

    #[test]
    fn test_json_profile_with_legacy_tag() {
        let text = r#"{
            "name": "dealers",
            "schema": {"columns": [
                {"name": "DEALER_CODE", "type": "text", "censor": "dealer_code"},
                {"name": "TOTAL", "type": "numeric"}
            ]},
            "system_prompt": "Emit JSON."
        }"#;
        let profile = Profile::from_json_str(text).unwrap();
        assert_eq!(
            profile.schema.get_column("DEALER_CODE").unwrap().censor,
            Some(CensorKind::Identifier)
        );
        assert_eq!(profile.sample_rows, DEFAULT_SAMPLE_ROWS);
    }

    #[test]
    fn test_json_profile_unknown_tag_fails() {
        let text = r#"{
            "name": "bad",
            "schema": {"columns": [{"name": "VIN", "type": "text", "censor": "vin"}]},
            "system_prompt": "Emit JSON."
        }"#;
        assert_eq!(Profile::from_json_str(text).unwrap_err().kind(), "profile_error");
    }

    #[test]
    fn test_schema_hints_embed_sample() {
        let profile = default_profile();
        let hints = profile.schema_hints("ID,BRAND\n1,LG\n");
        assert!(hints.contains("PRICE (numeric)"));
        assert!(hints.contains("1,LG"));
        assert!(hints.contains("<= 500"));
    }

    #[test]
    fn test_validate_columns_reports_missing() {
        let profile = default_profile();
        let data = Dataset::from_text_rows(&profile.schema, &["ID", "BRAND"], &[vec!["1", "LG"]]);
        let missing = profile.validate_columns(&data);
        assert_eq!(missing.len(), 9);
        assert!(profile.check_dataset(&data).is_err());
    }
}
