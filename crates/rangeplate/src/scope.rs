//! Scoped variables from the global sheet.
//!
//! Global sheet rows are triples `(scope, name, value)`:
//!
//! ```text
//! ALL     | domain   | example.net      <- every target
//! leaf1-2 | asn      | 65001            <- leaf1 and leaf2
//! GEN     | loopback | 10.0.0.1-4       <- sequence, see crate::sequence
//! FUN     | vrf      | def vrf(id): ... <- computed function
//! ```
//!
//! Plain rows are range-expanded cell by cell and every combination is
//! stored, so one row can assign many scopes and names at once. Later rows
//! and later combinations overwrite earlier ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use rangeplate_expand::expand;
use rangeplate_render::ComputedFunction;
use tracing::warn;

use crate::config::RunConfig;
use crate::error::Result;
use crate::workbook::is_blank_row;

/// Variables of one scope, by name.
pub type ScopeVars = BTreeMap<String, String>;

/// Scope key to its variables. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTable {
    scopes: BTreeMap<String, ScopeVars>,
}

impl ScopeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one variable in one scope.
    pub fn insert(
        &mut self,
        scope: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.scopes
            .entry(scope.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Variables of a scope, if it has any.
    pub fn get(&self, scope: &str) -> Option<&ScopeVars> {
        self.scopes.get(scope)
    }

    /// Returns `true` if no scope was loaded.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Scope keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }
}

/// Computed functions by the name templates call them by.
pub type FunctionTable = BTreeMap<String, Arc<ComputedFunction>>;

/// Reads the `(kind, name, value)` triple of a global row; missing cells are
/// empty.
fn triple<S: AsRef<str>>(row: &[S]) -> (&str, &str, &str) {
    (cell(row, 0), cell(row, 1), cell(row, 2))
}

fn cell<S: AsRef<str>>(row: &[S], index: usize) -> &str {
    row.get(index).map_or("", |c| c.as_ref())
}

/// Builds the scope table from global rows.
///
/// Rows tagged as sequences or functions are skipped; reading stops at the
/// first all-empty row.
pub fn load_scopes<S: AsRef<str>>(rows: &[&[S]], config: &RunConfig) -> ScopeTable {
    let mut table = ScopeTable::new();
    for row in rows.iter().take_while(|row| !is_blank_row(row)) {
        let (scope, name, value) = triple(row);
        if scope == config.sequence_tag || scope == config.function_tag {
            continue;
        }
        let scopes = expand(scope);
        let names = expand(name);
        let values = expand(value);
        for s in &scopes {
            for n in &names {
                for v in &values {
                    table.insert(s.as_str(), n.as_str(), v.as_str());
                }
            }
        }
    }
    table
}

/// Builds the function table from global rows tagged as functions.
///
/// A definition whose own name differs from the row's name is registered
/// under the row's name with a warning. A definition that does not parse or
/// compile aborts the load.
pub fn load_functions<S: AsRef<str>>(rows: &[&[S]], config: &RunConfig) -> Result<FunctionTable> {
    let mut functions = FunctionTable::new();
    for row in rows.iter().take_while(|row| !is_blank_row(row)) {
        let (kind, name, definition) = triple(row);
        if kind != config.function_tag {
            continue;
        }
        let func = ComputedFunction::parse(name, definition)?;
        if let Some(declared) = func.name_mismatch() {
            warn!(
                "function name <{}> different from function value <{}>",
                name, declared
            );
        }
        functions.insert(name.to_string(), Arc::new(func));
    }
    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn borrowed(rows: &[Vec<String>]) -> Vec<&[String]> {
        rows.iter().map(Vec::as_slice).collect()
    }

    #[test]
    fn test_scopes_expand_every_cell() {
        let data = rows(&[
            &["ALL", "domain", "example.net"],
            &["leaf1-2", "asn;as_alt", "65001"],
        ]);
        let table = load_scopes(&borrowed(&data), &RunConfig::default());

        assert_eq!(table.get("ALL").unwrap()["domain"], "example.net");
        for host in ["leaf1", "leaf2"] {
            let vars = table.get(host).unwrap();
            assert_eq!(vars["asn"], "65001");
            assert_eq!(vars["as_alt"], "65001");
        }
    }

    #[test]
    fn test_scopes_last_value_wins() {
        let data = rows(&[&["ALL", "vlan", "10-12"], &["ALL", "mtu", "1500"], &["ALL", "mtu", "9000"]]);
        let table = load_scopes(&borrowed(&data), &RunConfig::default());
        let all = table.get("ALL").unwrap();
        assert_eq!(all["vlan"], "12");
        assert_eq!(all["mtu"], "9000");
    }

    #[test]
    fn test_scopes_skip_tagged_rows_and_stop_at_blank() {
        let data = rows(&[
            &["GEN", "lo", "1-3"],
            &["FUN", "f", "def f(x, y): x ~ y"],
            &["ALL", "a", "1"],
            &["", "", ""],
            &["ALL", "b", "2"],
        ]);
        let table = load_scopes(&borrowed(&data), &RunConfig::default());
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["ALL"]);
        assert!(table.get("ALL").unwrap().get("b").is_none());
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let data = rows(&[&["ALL", "flag"]]);
        let table = load_scopes(&borrowed(&data), &RunConfig::default());
        assert_eq!(table.get("ALL").unwrap()["flag"], "");
    }

    #[test]
    fn test_load_functions() {
        let data = rows(&[
            &["FUN", "vrf", "def vrf(id): 'ip-vrf-' ~ id"],
            &["FUN", "alias", "def other(x): x"],
            &["ALL", "a", "1"],
        ]);
        let functions = load_functions(&borrowed(&data), &RunConfig::default()).unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions["alias"].declared_name(), "other");
        assert!(functions["vrf"].name_mismatch().is_none());
    }

    #[test]
    fn test_load_functions_rejects_bad_definition() {
        let data = rows(&[&["FUN", "broken", "print('x')"]]);
        let err = load_functions(&borrowed(&data), &RunConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Function(_)));
    }
}
