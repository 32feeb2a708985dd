//! Typed cell values.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::schema::ColumnType;

/// Timestamp layouts accepted for date cells and operands, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Value {
    /// Convert a raw text cell using the column's declared type.
    ///
    /// Surrounding whitespace is dropped, so a text cell is already in the
    /// canonical form used for pseudonyms. Blank cells and cells that do not
    /// parse as the declared type become [`Value::Null`].
    pub fn parse_cell(raw: &str, column_type: ColumnType) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match column_type {
            ColumnType::Text => Value::Text(trimmed.to_string()),
            ColumnType::Numeric => parse_number(trimmed).map_or(Value::Null, Value::Number),
            ColumnType::Date => parse_date(trimmed).map_or(Value::Null, Value::Date),
        }
    }

    /// Coerce a JSON operand from a filter clause to the column's type.
    pub fn from_json(json: &serde_json::Value, column_type: ColumnType) -> Result<Value, String> {
        use serde_json::Value as Json;

        match (column_type, json) {
            (_, Json::Null) => Err("operand is null".to_string()),
            (ColumnType::Numeric, Json::Number(n)) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not a finite number", n)),
            (ColumnType::Numeric, Json::String(s)) => parse_number(s.trim())
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not numeric", s)),
            (ColumnType::Date, Json::String(s)) => parse_date(s.trim())
                .map(Value::Date)
                .ok_or_else(|| format!("'{}' is not a recognizable date", s)),
            (ColumnType::Text, Json::String(s)) => Ok(Value::Text(s.clone())),
            (ColumnType::Text, Json::Number(n)) => Ok(Value::Text(
                n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
            )),
            (ColumnType::Text, Json::Bool(b)) => Ok(Value::Text(b.to_string())),
            (ty, other) => Err(format!("{} is not a valid {} operand", other, ty)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of the same kind. Mixed kinds and nulls are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order over non-null values; mixed kinds fall back to a fixed kind rank.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank())),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Date(_) => 1,
            Value::Text(_) => 2,
            Value::Null => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Date(d) => f.write_str(&format_date(d)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Date(d) => serializer.serialize_str(&format_date(d)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Render a number the way a person would write it: integral values without
/// a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn format_date(d: &NaiveDateTime) -> String {
    if d.time() == NaiveTime::MIN {
        d.format("%Y-%m-%d").to_string()
    } else {
        d.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date or timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    parse_date_parts(s).map(|(d, _)| d)
}

/// Parse a date or timestamp, also reporting whether the input carried only a date.
pub(crate) fn parse_date_parts(s: &str) -> Option<(NaiveDateTime, bool)> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some((dt.naive_utc(), false));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((dt, false));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some((d.and_time(NaiveTime::MIN), true));
        }
    }
    None
}
