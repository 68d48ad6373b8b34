//! Row expansion: one spreadsheet row into many records.
//!
//! Every cell of a row is expanded with [`expand`](crate::expand), and the
//! Cartesian product of the per-cell expansions gives one [`Record`] per
//! combination. The first column varies slowest and the last column fastest,
//! exactly like nested loops written in column order:
//!
//! ```text
//! host   | port
//! h1;h2  | 1-2
//!
//! => {host: h1, port: 1}
//!    {host: h1, port: 2}
//!    {host: h2, port: 1}
//!    {host: h2, port: 2}
//! ```
//!
//! After a combination is assembled each field is normalized once more:
//! the `[NO_RANGE]` marker is stripped, `[[...]]` is decoded into structured
//! data and `[...]` is re-expanded into a list.

use crate::nested::decode_nested;
use crate::range::{expand, NO_RANGE_MARKER};
use crate::value::FieldValue;

/// One concrete combination of a row's expanded cells, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Later fields win on lookup when names repeat.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Looks up a field by header name.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Iterates over the fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.push(key, value);
        }
        record
    }
}

/// Expands a row against its header names.
///
/// Positions whose cell or header is empty are padding and are dropped from
/// both sides before expansion. Cells beyond the last header (and headers
/// beyond the last cell) are ignored.
///
/// The returned iterator is lazy: records are built one at a time, in
/// last-column-fastest order.
///
/// # Example
///
/// ```
/// use rangeplate_expand::{expand_row, FieldValue};
///
/// let row = ["h1", "1-2"];
/// let keys = ["host", "port"];
/// let ports: Vec<_> = expand_row(&row, &keys)
///     .map(|r| r.get("port").cloned())
///     .collect();
/// assert_eq!(ports, vec![Some(FieldValue::from("1")), Some(FieldValue::from("2"))]);
/// ```
pub fn expand_row<R, K>(row: &[R], keys: &[K]) -> Records
where
    R: AsRef<str>,
    K: AsRef<str>,
{
    let (keys, columns): (Vec<String>, Vec<Vec<String>>) = keys
        .iter()
        .zip(row.iter())
        .filter(|(key, cell)| !key.as_ref().is_empty() && !cell.as_ref().is_empty())
        .map(|(key, cell)| (key.as_ref().to_string(), expand(cell.as_ref())))
        .unzip();
    Records::new(keys, columns)
}

/// Lazy Cartesian product over a row's expanded cells.
///
/// Created by [`expand_row`].
#[derive(Debug, Clone)]
pub struct Records {
    keys: Vec<String>,
    columns: Vec<Vec<String>>,
    /// Index into each column for the next record; `None` once exhausted.
    cursor: Option<Vec<usize>>,
}

impl Records {
    fn new(keys: Vec<String>, columns: Vec<Vec<String>>) -> Self {
        let cursor = if columns.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; columns.len()])
        };
        Self {
            keys,
            columns,
            cursor,
        }
    }

    /// Total number of records the row expands to.
    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).product()
    }

    fn advance(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        for (pos, column) in cursor.iter_mut().zip(&self.columns).rev() {
            *pos += 1;
            if *pos < column.len() {
                return;
            }
            *pos = 0;
        }
        // Every position wrapped: the product is complete.
        self.cursor = None;
    }
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let cursor = self.cursor.as_ref()?;
        let record = self
            .keys
            .iter()
            .zip(cursor.iter().zip(&self.columns))
            .map(|(key, (&pos, column))| (key.clone(), normalize_field(&column[pos])))
            .collect();
        self.advance();
        Some(record)
    }
}

/// Second-pass normalization of one expanded value.
///
/// Nested literals that fail to decode are kept as scalar text.
pub fn normalize_field(value: &str) -> FieldValue {
    if let Some(rest) = value.strip_prefix(NO_RANGE_MARKER) {
        return FieldValue::Scalar(rest.to_string());
    }
    if value.starts_with("[[") && value.ends_with("]]") {
        return match decode_nested(value) {
            Some(decoded) => FieldValue::Nested(decoded),
            None => FieldValue::Scalar(value.to_string()),
        };
    }
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        return FieldValue::List(expand(&trimmed[1..trimmed.len() - 1]));
    }
    FieldValue::Scalar(value.to_string())
}
