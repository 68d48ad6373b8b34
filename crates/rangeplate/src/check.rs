//! Workbook checks run before anything is rendered.
//!
//! Problems are collected across the whole workbook and reported together,
//! so a broken workbook is fixed in one pass instead of one error per run.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

use crate::config::RunConfig;
use crate::driver::SourceUnit;
use crate::error::{Error, Result};
use crate::workbook::Workbook;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("expression pattern is valid"));

// identifier, then any chain of `.attr`, `[index]` or `(args)`, then filters
static EXPRESSION_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^[A-Za-z_][A-Za-z0-9_]*(\s*(\.[A-Za-z_][A-Za-z0-9_]*|\[[^\]]*\]|\([^)]*\)))*\s*(\|.*)?$",
    )
    .expect("expression body pattern is valid")
});

/// Returns `true` for names usable as template variables.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Lists every `{{ ... }}` expression of a template that does not start with
/// a variable name.
pub fn invalid_expressions(template: &str) -> Vec<String> {
    EXPRESSION
        .captures_iter(template)
        .filter_map(|caps| {
            let body = caps[1].trim_matches(|c: char| c == '-' || c == '+').trim();
            if EXPRESSION_BODY.is_match(body) {
                None
            } else {
                Some(caps[0].to_string())
            }
        })
        .collect()
}

/// Checks sizes, names and template expressions of every sheet.
///
/// # Errors
///
/// [`Error::Validation`] listing every problem found.
pub fn check_workbook(workbook: &Workbook, config: &RunConfig) -> Result<()> {
    let mut problems = Vec::new();

    for sheet in workbook.sheets() {
        let name = sheet.name();
        if config.is_skipped(name) {
            continue;
        }
        if sheet.max_row() > config.max_rows {
            problems.push(format!(
                "[{}] has {} rows, more than the {} allowed",
                name,
                sheet.max_row(),
                config.max_rows
            ));
        }
        if sheet.max_col() > config.max_cols {
            problems.push(format!(
                "[{}] has {} columns, more than the {} allowed",
                name,
                sheet.max_col(),
                config.max_cols
            ));
        }

        let Some(unit) = SourceUnit::from_sheet(sheet, config) else {
            continue;
        };
        if !is_identifier(&unit.name) {
            problems.push(format!("sheet name <{}> is not a valid identifier", unit.name));
        }
        for header in unit.headers.iter().filter(|h| !h.is_empty()) {
            if !is_identifier(header) {
                problems.push(format!("[{}] header <{}> is not a valid identifier", unit.name, header));
            }
        }
        for expr in invalid_expressions(&unit.template) {
            problems.push(format!("[{}] invalid template variable {}", unit.name, expr));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        for problem in &problems {
            error!("{}", problem);
        }
        Err(Error::Validation(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Sheet;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("host"));
        assert!(is_identifier("_vlan_10"));
        assert!(!is_identifier("10vlan"));
        assert!(!is_identifier("my-host"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_valid_expressions() {
        let template = "{{ host }} {{ ports[0] }} {{ cfg.mtu }} {{ vrf(id) }} \
                        {{ name | upper }} {{- trim -}} {{ svc(id).name|lower }}";
        assert!(invalid_expressions(template).is_empty());
    }

    #[test]
    fn test_invalid_expressions() {
        let found = invalid_expressions("{{ 1 + x }} {{ host }} {{ 'lit' }} {{ }}");
        assert_eq!(found, vec!["{{ 1 + x }}", "{{ 'lit' }}", "{{ }}"]);
    }

    #[test]
    fn test_check_collects_all_problems() {
        let config = RunConfig {
            max_rows: 3,
            ..RunConfig::default()
        };
        let workbook = Workbook::new(vec![
            Sheet::from_csv("bad-name", "t\n{{ 1 }},host,my port\n,h1,1\n,h2,2\n").unwrap(),
            Sheet::from_csv("_ignored", "t\n{{ 1 }},bad header\n,h1\n,h2\n,h3\n").unwrap(),
        ]);

        match check_workbook(&workbook, &config) {
            Err(Error::Validation(problems)) => {
                assert_eq!(problems.len(), 4, "{:?}", problems);
                assert!(problems[0].contains("4 rows"));
                assert!(problems[1].contains("bad-name"));
                assert!(problems[2].contains("my port"));
                assert!(problems[3].contains("{{ 1 }}"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_workbook_passes() {
        let workbook = Workbook::new(vec![
            Sheet::from_csv("GLOBAL_VARS", "g\nscope,name,value\n,ALL,x\n").unwrap(),
            Sheet::from_csv("ifaces", "t\n{{ host }},host\n,h1\n").unwrap(),
        ]);
        assert!(check_workbook(&workbook, &RunConfig::default()).is_ok());
    }
}
