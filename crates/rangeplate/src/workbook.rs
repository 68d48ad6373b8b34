//! Workbook reader.
//!
//! A workbook is a directory of CSV files, one per sheet. The file stem is
//! the sheet name (`GLOBAL_VARS.csv`, `interfaces.csv`, ...) and sheets are
//! visited in file-name order.
//!
//! Cells are stripped of surrounding whitespace and rows are padded with
//! empty cells to the width of the widest row, so a sheet is always a
//! rectangle like its spreadsheet original.
//!
//! Completely empty lines are skipped by the CSV reader; an end-of-table row
//! has to be written with separators (`,,,`) as spreadsheet exports do.

use std::path::Path;

use crate::error::Result;

/// One sheet: a named rectangle of text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    cells: Vec<Vec<String>>,
}

impl Sheet {
    /// Builds a sheet from raw rows, stripping and padding cells.
    pub fn new<R, C>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| c.as_ref().trim().to_string()).collect())
            .collect();
        let width = cells.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut cells {
            row.resize(width, String::new());
        }
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Parses a sheet from CSV text.
    pub fn from_csv(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        Ok(Self::new(name, rows))
    }

    /// The sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn max_row(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns.
    pub fn max_col(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// The cell at a 1-based position, or `""` outside the sheet.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        row.checked_sub(1)
            .and_then(|r| self.cells.get(r))
            .and_then(|cells| col.checked_sub(1).and_then(|c| cells.get(c)))
            .map_or("", String::as_str)
    }

    /// Rows from `start_row` down, each starting at `start_col` (1-based).
    pub fn rows(&self, start_row: usize, start_col: usize) -> Vec<&[String]> {
        let skip_cols = start_col.saturating_sub(1);
        self.cells
            .iter()
            .skip(start_row.saturating_sub(1))
            .map(|row| row.get(skip_cols..).unwrap_or(&[]))
            .collect()
    }

    /// Like [`rows`](Self::rows), but stops before the first all-empty row.
    pub fn table(&self, start_row: usize, start_col: usize) -> Vec<&[String]> {
        self.rows(start_row, start_col)
            .into_iter()
            .take_while(|row| !is_blank_row(row))
            .collect()
    }
}

/// Returns `true` when every cell of a row is empty.
pub fn is_blank_row<S: AsRef<str>>(row: &[S]) -> bool {
    row.iter().all(|c| c.as_ref().is_empty())
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Builds a workbook from sheets, keeping their order.
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Reads every `*.csv` file of a directory, in file-name order.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sheets = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = std::fs::read_to_string(&path)?;
            sheets.push(Sheet::from_csv(name, &text)?);
        }
        Ok(Self { sheets })
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Finds a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
