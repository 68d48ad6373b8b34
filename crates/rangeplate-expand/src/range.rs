//! Range-expression expansion.
//!
//! A range expression is the compact notation spreadsheet authors use to
//! describe a set of values in a single cell:
//!
//! ```text
//! 1/4;2/3-6;3/3/3-5;4;5-6   =>  1/4 2/3 2/4 2/5 2/6 3/3/3 3/3/4 3/3/5 4 5 6
//! port01-03                 =>  port01 port02 port03
//! ip-vrf-1001,mac-vrf-1001  =>  ip-vrf-1001 mac-vrf-1001
//! ```
//!
//! Segments are separated by `;` or `,`. Inside a segment only a numeric range
//! at the very end is expanded (`test1/2-3` expands, `test1/3-4extra` does not).
//! Zero padding on either bound switches to fixed-width output, using the width
//! of the end bound as written.
//!
//! Three bracket forms are passed through untouched so the row expander can
//! handle them once a record has been assembled:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `[NO_RANGE]text` | literal text, marker stripped later |
//! | `[[...]]` | nested literal, decoded later |
//! | `[...]` | list, interior re-expanded later |

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix that disables expansion for a cell.
pub const NO_RANGE_MARKER: &str = "[NO_RANGE]";

// The prefix alternation must be able to end on a non-digit or be empty, so
// `1-2-3` splits as `1-` + `2-3` and `12-3` as `` + `12-3`.
static TRAILING_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)(.*[^0-9]|)(0*)([0-9]+)-(0*)([0-9]+)$")
        .expect("trailing range pattern is valid")
});

/// Expands one range expression into its ordered values.
///
/// Expansion never fails: anything that does not parse as a trailing range is
/// emitted verbatim. A range whose start is greater than its end yields no
/// values.
///
/// # Example
///
/// ```
/// use rangeplate_expand::expand;
///
/// assert_eq!(expand("eth1/1-3"), vec!["eth1/1", "eth1/2", "eth1/3"]);
/// assert_eq!(expand("port01-03"), vec!["port01", "port02", "port03"]);
/// assert_eq!(expand("a;b,c"), vec!["a", "b", "c"]);
/// ```
pub fn expand(text: &str) -> Vec<String> {
    if is_passthrough(text) || !text.contains([';', ',', '-']) {
        return vec![text.to_string()];
    }

    let normalized = text.replace(',', ";");
    let mut values = Vec::new();
    for segment in normalized.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match TrailingRange::parse(segment) {
            Some(range) => range.push_values(&mut values),
            None => values.push(segment.to_string()),
        }
    }
    values
}

/// Returns `true` for the bracket and marker forms that expansion leaves alone.
fn is_passthrough(text: &str) -> bool {
    text.starts_with(NO_RANGE_MARKER) || (text.starts_with('[') && text.ends_with(']'))
}

/// A numeric range found at the end of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrailingRange<'a> {
    prefix: &'a str,
    start: u64,
    end: u64,
    /// Output width when either bound was zero padded.
    width: Option<usize>,
}

impl<'a> TrailingRange<'a> {
    fn parse(segment: &'a str) -> Option<Self> {
        let caps = TRAILING_RANGE.captures(segment)?;
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let start_zeros = caps.get(2).map_or("", |m| m.as_str());
        let start_digits = caps.get(3)?.as_str();
        let end_zeros = caps.get(4).map_or("", |m| m.as_str());
        let end_digits = caps.get(5)?.as_str();

        // Bounds too large for u64 are treated as plain text.
        let start = start_digits.parse().ok()?;
        let end = end_digits.parse().ok()?;

        let width = if start_zeros.is_empty() && end_zeros.is_empty() {
            None
        } else {
            Some(end_zeros.len() + end_digits.len())
        };

        Some(Self {
            prefix,
            start,
            end,
            width,
        })
    }

    fn push_values(&self, out: &mut Vec<String>) {
        if self.start > self.end {
            return;
        }
        for n in self.start..=self.end {
            let number = match self.width {
                Some(width) => format!("{:0width$}", n, width = width),
                None => n.to_string(),
            };
            out.push(format!("{}{}", self.prefix, number));
        }
    }
}
