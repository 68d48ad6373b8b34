//! Field values produced by row expansion.
//!
//! A spreadsheet cell is always text, but after expansion a field can hold one
//! of three shapes. [`FieldValue`] keeps them apart instead of passing around a
//! string that is sometimes a list.

use serde::Serialize;

/// The value of one field in an expanded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single concrete value.
    Scalar(String),
    /// A bracketed cell (`[a;b1-2]`) whose interior was re-expanded.
    List(Vec<String>),
    /// A nested literal (`[['a', 1], ['b', 2]]`), decoded as structured data.
    Nested(serde_json::Value),
}

impl FieldValue {
    /// Returns the scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` if this is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldValue::Scalar(_))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}
