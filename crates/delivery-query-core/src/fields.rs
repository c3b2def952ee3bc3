//! Field model of the content index.
//!
//! Index handlers describe the schema with [`IndexField`]s and contribute
//! per-document values with [`IndexFieldValue`]s. The [`FieldType`] tells the
//! index engine how to store, analyze and compare a field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the index engine stores and compares a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Stored as a single untokenized term, matched exactly.
    StringRaw,
    /// Tokenized full-text field, matched case-insensitively.
    StringAnalyzed,
    /// Stored in a form suitable for ordering (case-insensitive).
    StringSortable,
    /// Numeric field supporting range comparisons.
    Number,
    /// Date field supporting range comparisons.
    Date,
}

impl FieldType {
    /// Whether range operators (`<`, `<=`, `>`, `>=`) apply to this type.
    pub fn supports_range(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Date)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::StringRaw => "string-raw",
            FieldType::StringAnalyzed => "string-analyzed",
            FieldType::StringSortable => "string-sortable",
            FieldType::Number => "number",
            FieldType::Date => "date",
        };
        f.write_str(s)
    }
}

/// Schema entry for one field of the content index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    pub field_name: String,
    pub field_type: FieldType,
    /// Culture-varying fields get a distinct value in each per-culture document.
    pub varies_by_culture: bool,
}

impl IndexField {
    pub fn new(field_name: impl Into<String>, field_type: FieldType, varies_by_culture: bool) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            varies_by_culture,
        }
    }
}

/// A single value stored in an index field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl FieldValue {
    /// Textual form used for string comparisons.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Date(dt) => dt.to_rfc3339(),
        }
    }

    /// Numeric form, if the value is (or parses as) a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Date(_) => None,
        }
    }

    /// Date form, if the value is (or parses as) a date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(dt) => Some(*dt),
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

/// The values of one field for one index document.
///
/// A field may carry several values (e.g. ancestor ids or tags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFieldValue {
    pub field_name: String,
    pub values: Vec<FieldValue>,
}

impl IndexFieldValue {
    pub fn new(field_name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            field_name: field_name.into(),
            values,
        }
    }

    /// Shorthand for a field with exactly one value.
    pub fn single(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, vec![value.into()])
    }
}

/// Parse a date given as RFC 3339 or as a plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
