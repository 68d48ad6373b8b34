//! # Rangeplate Expand - range expressions and row expansion
//!
//! `rangeplate-expand` turns the compact range notation used in configuration
//! spreadsheets into concrete values, and turns a spreadsheet row into one
//! record per combination of its expanded cells.
//!
//! ## Quick Start
//!
//! ```rust
//! use rangeplate_expand::{expand, expand_row, FieldValue};
//!
//! assert_eq!(expand("leaf1-2"), vec!["leaf1", "leaf2"]);
//!
//! let records: Vec<_> = expand_row(&["leaf1-2", "eth1/1"], &["host", "iface"]).collect();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].get("host"), Some(&FieldValue::from("leaf2")));
//! ```
//!
//! ## Range Grammar
//!
//! | Input | Output |
//! |-------|--------|
//! | `a;b,c` | `a`, `b`, `c` |
//! | `eth1/1-3` | `eth1/1`, `eth1/2`, `eth1/3` |
//! | `port01-03` | `port01`, `port02`, `port03` |
//! | `test1/3-4extra` | `test1/3-4extra` (range not at the end) |
//! | `[NO_RANGE]a-b` | `[NO_RANGE]a-b` (marker stripped by row expansion) |
//! | `[x1-2]` | one field holding the list `x1`, `x2` (after row expansion) |
//! | `[['a', 1]]` | one field holding decoded structured data |

mod nested;
mod range;
mod row;
mod value;

pub use nested::decode_nested;
pub use range::{expand, NO_RANGE_MARKER};
pub use row::{expand_row, normalize_field, Record, Records};
pub use value::FieldValue;
