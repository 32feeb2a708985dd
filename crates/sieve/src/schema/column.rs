//! Column schema definition.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;
use crate::censor::CensorKind;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name, exactly as it appears in the dataset header.
    pub name: String,
    /// Declared data type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Censoring applied to this column before values leave the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub censor: Option<CensorKind>,
}

impl ColumnSchema {
    /// Create a new column schema.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            censor: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Numeric)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date)
    }

    /// Mark this column as sensitive.
    pub fn censored(mut self, kind: CensorKind) -> Self {
        self.censor = Some(kind);
        self
    }

    /// Check if values in this column must be pseudonymized.
    pub fn is_sensitive(&self) -> bool {
        self.censor.is_some()
    }
}
