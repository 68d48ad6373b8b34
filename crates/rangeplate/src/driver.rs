//! The render pass over one source unit.
//!
//! A source unit is one data sheet: a template, a header row and data rows.
//! For each unit the driver:
//!
//! 1. extracts the template's variable names once
//! 2. writes the header block to every target of the unit
//! 3. expands every row, merges each record and renders it into the buffer of
//!    the record's target
//! 4. writes the footer block to every target
//!
//! Rendering is strictly sequential; sequence values are consumed in row and
//! record order.

use std::collections::{BTreeMap, BTreeSet};

use rangeplate_expand::{expand, expand_row, FieldValue, Record, NO_RANGE_MARKER};
use rangeplate_render::{Blocks, TemplateEngine};
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::merge::{merge, MergeKeys};
use crate::scope::{FunctionTable, ScopeTable};
use crate::sequence::SequenceBank;
use crate::workbook::Sheet;

/// One sheet's worth of rendering input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub template: String,
    pub headers: Vec<String>,
    /// Data rows up to (not including) the first all-empty row.
    pub rows: Vec<Vec<String>>,
}

impl SourceUnit {
    /// Reads a unit from a sheet.
    ///
    /// Returns `None` for the global sheet, skipped sheets, and sheets whose
    /// template cell or first data cell is empty.
    pub fn from_sheet(sheet: &Sheet, config: &RunConfig) -> Option<Self> {
        let name = sheet.name();
        if name == config.global_sheet || config.is_skipped(name) {
            return None;
        }
        let template = sheet.cell(config.template_row, config.template_col);
        let first_cell = sheet.cell(config.data_start_row, config.data_start_col);
        if template.is_empty() || first_cell.is_empty() {
            debug!("[{}] no template or data, skipped", name);
            return None;
        }

        let headers = sheet
            .rows(config.header_row, config.data_start_col)
            .first()
            .map(|row| row.to_vec())
            .unwrap_or_default();
        let rows = sheet
            .table(config.data_start_row, config.data_start_col)
            .into_iter()
            .map(<[String]>::to_vec)
            .collect();

        Some(Self {
            name: name.to_string(),
            template: template.to_string(),
            headers,
            rows,
        })
    }

    /// Sorted set of targets named by the unit's rows.
    ///
    /// Each target cell is range-expanded; `[NO_RANGE]` markers are removed.
    pub fn targets(&self, target_field: &str) -> BTreeSet<String> {
        let Some(col) = self.headers.iter().position(|h| h == target_field) else {
            return BTreeSet::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|cell| !cell.is_empty())
            .flat_map(|cell| expand(cell))
            .map(|t| match t.strip_prefix(NO_RANGE_MARKER) {
                Some(rest) => rest.to_string(),
                None => t,
            })
            .collect()
    }
}

/// Per-target text accumulated during a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffers {
    buffers: BTreeMap<String, String>,
}

impl OutputBuffers {
    /// Appends text to a target's buffer.
    pub fn append(&mut self, target: &str, text: &str) {
        self.buffers.entry(target.to_string()).or_default().push_str(text);
    }

    /// The text buffered for a target.
    pub fn get(&self, target: &str) -> Option<&str> {
        self.buffers.get(target).map(String::as_str)
    }

    /// Targets and their text, in target order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.buffers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of targets with output.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns `true` when nothing was buffered.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Units already warned about unresolved template variables.
///
/// Kept for the whole run so each unit warns at most once.
#[derive(Debug, Clone, Default)]
pub struct WarnedUnits {
    seen: BTreeSet<String>,
}

impl WarnedUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning for `unit`; returns `true` the first time only.
    pub fn first(&mut self, unit: &str) -> bool {
        self.seen.insert(unit.to_string())
    }
}

/// What rendering one unit produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOutput {
    pub buffers: OutputBuffers,
    /// Rendered, non-blank records.
    pub records: usize,
    /// Union of template names no record could resolve.
    pub unresolved: BTreeSet<String>,
}

/// Renders units against loaded global state.
pub struct RenderDriver<'a, E> {
    engine: &'a E,
    config: &'a RunConfig,
    scopes: &'a ScopeTable,
    functions: &'a FunctionTable,
}

impl<'a, E: TemplateEngine> RenderDriver<'a, E> {
    pub fn new(
        engine: &'a E,
        config: &'a RunConfig,
        scopes: &'a ScopeTable,
        functions: &'a FunctionTable,
    ) -> Self {
        Self {
            engine,
            config,
            scopes,
            functions,
        }
    }

    /// Renders one unit into per-target buffers.
    ///
    /// # Errors
    ///
    /// Template errors, exhausted sequences and records without a usable
    /// target abort the unit (and the run).
    pub fn render_unit(
        &self,
        unit: &SourceUnit,
        sequences: &mut SequenceBank,
        warned: &mut WarnedUnits,
    ) -> Result<UnitOutput> {
        let template_vars = self
            .engine
            .declared_variables(&unit.template)
            .map_err(|e| Error::render(&unit.name, e))?;
        let blocks = Blocks::extract(&unit.template);
        let targets = unit.targets(&self.config.target_field);
        let keys = MergeKeys {
            wildcard_scope: &self.config.wildcard_scope,
            target_field: &self.config.target_field,
        };

        let mut output = UnitOutput::default();

        if let Some(header) = blocks.header_text() {
            for target in &targets {
                output.buffers.append(target, &header);
            }
        }

        for row in &unit.rows {
            for record in expand_row(row, &unit.headers) {
                let target = self.target_of(unit, &record)?;
                let merged = merge(
                    &record,
                    keys,
                    self.scopes,
                    sequences,
                    self.functions,
                    &template_vars,
                )?;

                if !merged.unresolved.is_empty() && warned.first(&unit.name) {
                    warn!(
                        "undefined variables found in template [{}] : <{}>",
                        unit.name,
                        merged
                            .unresolved
                            .iter()
                            .map(String::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                output.unresolved.extend(merged.unresolved);

                let mut text = self
                    .engine
                    .render(&unit.template, &merged.variables)
                    .map_err(|e| Error::render(&unit.name, e))?;
                text.push('\n');
                if !text.trim().is_empty() {
                    output.buffers.append(&target, &text);
                    output.records += 1;
                }
            }
        }

        if let Some(footer) = blocks.footer_text() {
            for target in &targets {
                output.buffers.append(target, &footer);
            }
        }

        Ok(output)
    }

    fn target_of(&self, unit: &SourceUnit, record: &Record) -> Result<String> {
        let field = &self.config.target_field;
        match record.get(field) {
            Some(FieldValue::Scalar(target)) => Ok(target.clone()),
            Some(_) => Err(Error::InvalidTarget {
                unit: unit.name.clone(),
                field: field.clone(),
            }),
            None => Err(Error::MissingTargetField {
                unit: unit.name.clone(),
                field: field.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangeplate_render::MiniJinjaEngine;

    fn unit(template: &str, headers: &[&str], rows: &[&[&str]]) -> SourceUnit {
        SourceUnit {
            name: "ifaces".into(),
            template: template.into(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn render(unit: &SourceUnit, scopes: &ScopeTable, sequences: &mut SequenceBank) -> Result<UnitOutput> {
        let engine = MiniJinjaEngine::new();
        let config = RunConfig::default();
        let functions = FunctionTable::new();
        let driver = RenderDriver::new(&engine, &config, scopes, &functions);
        driver.render_unit(unit, sequences, &mut WarnedUnits::new())
    }

    #[test]
    fn test_records_routed_to_targets() {
        let unit = unit(
            "{{ host }}:{{ port }}",
            &["host", "port"],
            &[&["h1", "1-2"], &["h2", "3"]],
        );
        let out = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap();
        assert_eq!(out.records, 3);
        assert_eq!(out.buffers.get("h1"), Some("h1:1\nh1:2\n"));
        assert_eq!(out.buffers.get("h2"), Some("h2:3\n"));
    }

    #[test]
    fn test_header_and_footer_once_per_target() {
        let unit = unit(
            "{#HEADER\n!top\n#}{{ port }}{#FOOTER\n!end\n#}",
            &["host", "port"],
            &[&["h1;h2", "1-2"]],
        );
        let out = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap();
        assert_eq!(out.buffers.get("h1"), Some("!top\n1\n2\n!end\n\n"));
        assert_eq!(out.buffers.get("h2"), Some("!top\n1\n2\n!end\n\n"));
    }

    #[test]
    fn test_blank_renders_are_dropped() {
        let unit = unit(
            "{% if port == '2' %}p{{ port }}{% endif %}",
            &["host", "port"],
            &[&["h1", "1-3"]],
        );
        let out = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap();
        assert_eq!(out.records, 1);
        assert_eq!(out.buffers.get("h1"), Some("p2\n"));
    }

    #[test]
    fn test_scopes_and_sequences_applied() {
        let mut scopes = ScopeTable::new();
        scopes.insert("ALL", "domain", "lab");
        scopes.insert("h2", "domain", "prod");
        let mut seq = SequenceBank::new();
        seq.declare("ip", vec!["10.0.0.1".into(), "10.0.0.2".into()]);

        let unit = unit("{{ host }}.{{ domain }} {{ ip }}", &["host"], &[&["h1"], &["h2"]]);
        let out = render(&unit, &scopes, &mut seq).unwrap();
        assert_eq!(out.buffers.get("h1"), Some("h1.lab 10.0.0.1\n"));
        assert_eq!(out.buffers.get("h2"), Some("h2.prod 10.0.0.2\n"));
    }

    #[test]
    fn test_exhausted_sequence_aborts() {
        let mut seq = SequenceBank::new();
        seq.declare("ip", vec!["10.0.0.1".into()]);
        let unit = unit("{{ ip }}", &["host"], &[&["h1-2"]]);
        let err = render(&unit, &ScopeTable::new(), &mut seq).unwrap_err();
        assert!(matches!(err, Error::ExhaustedSequence { .. }));
    }

    #[test]
    fn test_missing_target_field() {
        let unit = unit("{{ port }}", &["port"], &[&["1"]]);
        let err = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap_err();
        assert!(matches!(err, Error::MissingTargetField { .. }));
    }

    #[test]
    fn test_list_target_rejected() {
        let unit = unit("{{ host }}", &["host"], &[&["[h1;h2]"]]);
        let err = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }

    #[test]
    fn test_unresolved_collected() {
        let unit = unit("{{ host }} {{ nope }}", &["host"], &[&["h1"], &["h2"]]);
        let out = render(&unit, &ScopeTable::new(), &mut SequenceBank::new()).unwrap();
        assert_eq!(out.unresolved.iter().collect::<Vec<_>>(), vec!["nope"]);
        assert_eq!(out.buffers.get("h1"), Some("h1 \n"));
    }

    #[test]
    fn test_unresolved_marks_unit_warned() {
        let engine = MiniJinjaEngine::new();
        let config = RunConfig::default();
        let scopes = ScopeTable::new();
        let functions = FunctionTable::new();
        let driver = RenderDriver::new(&engine, &config, &scopes, &functions);
        let mut warned = WarnedUnits::new();

        let clean = SourceUnit {
            name: "clean".into(),
            ..unit("{{ host }}", &["host"], &[&["h1"]])
        };
        driver
            .render_unit(&clean, &mut SequenceBank::new(), &mut warned)
            .unwrap();

        let noisy = unit("{{ host }} {{ nope }}", &["host"], &[&["h1-3"]]);
        let out = driver
            .render_unit(&noisy, &mut SequenceBank::new(), &mut warned)
            .unwrap();
        assert_eq!(out.records, 3);
        assert!(!warned.first("ifaces"));
        assert!(warned.first("clean"));

        // a later pass over the same unit finds it already warned
        driver
            .render_unit(&noisy, &mut SequenceBank::new(), &mut warned)
            .unwrap();
        assert!(!warned.first("ifaces"));
    }

    #[test]
    fn test_warned_once_per_unit() {
        let mut warned = WarnedUnits::new();
        assert!(warned.first("a"));
        assert!(!warned.first("a"));
        assert!(warned.first("b"));
    }

    #[test]
    fn test_targets_strip_marker() {
        let unit = unit("x", &["host", "p"], &[&["h2;h1", "1"], &["[NO_RANGE]core-1", "2"], &["", "3"]]);
        let targets: Vec<_> = unit.targets("host").into_iter().collect();
        assert_eq!(targets, vec!["core-1", "h1", "h2"]);
    }

    #[test]
    fn test_from_sheet() {
        let config = RunConfig::default();
        let sheet = Sheet::from_csv(
            "ifaces",
            "note\n{{ host }},host,port\n,h1,1\n,,\n,h9,9\n",
        )
        .unwrap();
        let unit = SourceUnit::from_sheet(&sheet, &config).unwrap();
        assert_eq!(unit.template, "{{ host }}");
        assert_eq!(unit.headers, vec!["host", "port"]);
        assert_eq!(unit.rows, vec![vec!["h1".to_string(), "1".to_string()]]);

        let global = Sheet::from_csv("GLOBAL_VARS", "a\nb,c\n,d\n").unwrap();
        assert!(SourceUnit::from_sheet(&global, &config).is_none());
        let skipped = Sheet::from_csv("_draft", "a\nb,c\n,d\n").unwrap();
        assert!(SourceUnit::from_sheet(&skipped, &config).is_none());
        let empty = Sheet::from_csv("empty", "a\n,host\n").unwrap();
        assert!(SourceUnit::from_sheet(&empty, &config).is_none());
    }
}
