//! Run configuration.
//!
//! Every setting has a default matching the conventional workbook layout, so
//! a configuration file only needs the keys it changes:
//!
//! ```yaml
//! target_field: device
//! output_prefix: CONFIGS
//! ```
//!
//! Row and column numbers are 1-based, like spreadsheet coordinates.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Settings that shape how a workbook is read and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Sheet holding scopes, sequences and functions.
    pub global_sheet: String,
    /// Scope key whose variables apply to every target.
    pub wildcard_scope: String,
    /// First-column tag of sequence rows in the global sheet.
    pub sequence_tag: String,
    /// First-column tag of function rows in the global sheet.
    pub function_tag: String,
    /// Header naming the field that selects the output target.
    pub target_field: String,
    /// Row of the template cell.
    pub template_row: usize,
    /// Column of the template cell.
    pub template_col: usize,
    /// Row holding the header names.
    pub header_row: usize,
    /// First data row.
    pub data_start_row: usize,
    /// First data column (also the first header column).
    pub data_start_col: usize,
    /// Sheets whose name starts with this prefix are ignored.
    pub skip_prefix: String,
    /// Largest accepted sheet height.
    pub max_rows: usize,
    /// Largest accepted sheet width.
    pub max_cols: usize,
    /// Output folder name prefix.
    pub output_prefix: String,
    /// Extension of per-target output files.
    pub output_extension: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            global_sheet: "GLOBAL_VARS".to_string(),
            wildcard_scope: "ALL".to_string(),
            sequence_tag: "GEN".to_string(),
            function_tag: "FUN".to_string(),
            target_field: "host".to_string(),
            template_row: 2,
            template_col: 1,
            header_row: 2,
            data_start_row: 3,
            data_start_col: 2,
            skip_prefix: "_".to_string(),
            max_rows: 1000,
            max_cols: 1000,
            output_prefix: "OUTPUTS".to_string(),
            output_extension: "txt".to_string(),
        }
    }
}

impl RunConfig {
    /// Parses a YAML configuration, filling unset keys with defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Output folder prefix: `<output_prefix>_<stem>` for an explicit
    /// workbook path, `output_prefix` alone otherwise.
    pub fn folder_prefix(&self, workbook: Option<&Path>) -> String {
        match workbook.and_then(Path::file_stem) {
            Some(stem) => format!("{}_{}", self.output_prefix, stem.to_string_lossy()),
            None => self.output_prefix.clone(),
        }
    }

    /// Returns `true` if a sheet of this name is ignored entirely.
    pub fn is_skipped(&self, sheet: &str) -> bool {
        !self.skip_prefix.is_empty() && sheet.starts_with(&self.skip_prefix)
    }
}
