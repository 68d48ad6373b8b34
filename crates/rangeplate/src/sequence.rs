//! Generated variables backed by finite sequences.
//!
//! A sequence row in the global sheet declares a name and a range expression:
//!
//! ```text
//! GEN | loopback | 10.0.0.1-4
//! ```
//!
//! Every record whose template reads `loopback` takes the next value, in
//! declared order, for the whole run. Running out of values is fatal: a
//! silently reused or missing address is worse than a stopped run.

use std::collections::BTreeMap;

use rangeplate_expand::expand;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::workbook::is_blank_row;

/// A named, ordered sequence with a read position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCursor {
    values: Vec<String>,
    position: usize,
}

impl SequenceCursor {
    /// Creates a cursor at the start of `values`.
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Number of values declared.
    pub fn declared(&self) -> usize {
        self.values.len()
    }

    /// Number of values not consumed yet.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }

    /// Takes the next value, or `None` when exhausted.
    fn advance(&mut self) -> Option<String> {
        let value = self.values.get(self.position)?.clone();
        self.position += 1;
        Some(value)
    }
}

/// All sequences of a run, by name.
///
/// The bank is the only mutable state shared across records. It is passed
/// by `&mut` through the render pass, so values are handed out strictly in
/// record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceBank {
    cursors: BTreeMap<String, SequenceCursor>,
}

impl SequenceBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or redeclares) a sequence.
    pub fn declare(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.cursors.insert(name.into(), SequenceCursor::new(values));
    }

    /// Returns `true` if a sequence of this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.cursors.contains_key(name)
    }

    /// Looks up a cursor without consuming.
    pub fn cursor(&self, name: &str) -> Option<&SequenceCursor> {
        self.cursors.get(name)
    }

    /// Sequence names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cursors.keys().map(String::as_str)
    }

    /// Returns `true` if no sequence was declared.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Takes the next value of a sequence.
    ///
    /// # Errors
    ///
    /// [`Error::ExhaustedSequence`] once every declared value was taken, and
    /// [`Error::UnknownSequence`] for a name that was never declared.
    pub fn consume(&mut self, name: &str) -> Result<String> {
        let cursor = self
            .cursors
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSequence(name.to_string()))?;
        cursor.advance().ok_or_else(|| Error::ExhaustedSequence {
            name: name.to_string(),
            declared: cursor.declared(),
        })
    }
}

/// Builds the sequence bank from global rows tagged as sequences.
///
/// Only the value cell is range-expanded; reading stops at the first
/// all-empty row.
pub fn load_sequences<S: AsRef<str>>(rows: &[&[S]], config: &RunConfig) -> SequenceBank {
    let mut bank = SequenceBank::new();
    for row in rows.iter().take_while(|row| !is_blank_row(row)) {
        let cell = |i: usize| row.get(i).map_or("", |c| c.as_ref());
        if cell(0) == config.sequence_tag {
            bank.declare(cell(1), expand(cell(2)));
        }
    }
    bank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_in_order_then_exhaust() {
        let mut bank = SequenceBank::new();
        bank.declare("lo", vec!["a".into(), "b".into(), "c".into()]);

        assert_eq!(bank.consume("lo").unwrap(), "a");
        assert_eq!(bank.consume("lo").unwrap(), "b");
        assert_eq!(bank.consume("lo").unwrap(), "c");
        assert_eq!(bank.cursor("lo").unwrap().remaining(), 0);

        match bank.consume("lo") {
            Err(Error::ExhaustedSequence { name, declared }) => {
                assert_eq!(name, "lo");
                assert_eq!(declared, 3);
            }
            other => panic!("expected exhausted sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sequence() {
        let mut bank = SequenceBank::new();
        assert!(matches!(bank.consume("nope"), Err(Error::UnknownSequence(_))));
    }

    #[test]
    fn test_cursors_are_independent() {
        let mut bank = SequenceBank::new();
        bank.declare("a", vec!["1".into(), "2".into()]);
        bank.declare("b", vec!["x".into()]);
        assert_eq!(bank.consume("a").unwrap(), "1");
        assert_eq!(bank.consume("b").unwrap(), "x");
        assert_eq!(bank.consume("a").unwrap(), "2");
    }

    #[test]
    fn test_load_sequences() {
        let data: Vec<Vec<String>> = vec![
            vec!["GEN".into(), "lo".into(), "10.0.0.1-3".into()],
            vec!["ALL".into(), "x".into(), "1".into()],
            vec!["GEN".into(), "asn".into(), "65001;65005".into()],
            vec![String::new(), String::new(), String::new()],
            vec!["GEN".into(), "late".into(), "1".into()],
        ];
        let rows: Vec<&[String]> = data.iter().map(Vec::as_slice).collect();
        let mut bank = load_sequences(&rows, &RunConfig::default());

        assert_eq!(bank.names().collect::<Vec<_>>(), vec!["asn", "lo"]);
        assert_eq!(bank.cursor("lo").unwrap().declared(), 3);
        assert_eq!(bank.consume("lo").unwrap(), "10.0.0.1");
        assert_eq!(bank.consume("asn").unwrap(), "65001");
        assert_eq!(bank.consume("asn").unwrap(), "65005");
        assert!(!bank.contains("late"));
    }

    #[test]
    fn test_redeclaration_replaces() {
        let mut bank = SequenceBank::new();
        bank.declare("a", vec!["1".into()]);
        bank.declare("a", vec!["9".into()]);
        assert_eq!(bank.consume("a").unwrap(), "9");
    }
}
