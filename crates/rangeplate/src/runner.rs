//! Whole-run orchestration.
//!
//! [`Runner`] ties the pieces together: check the workbook, load the global
//! sheet once, then render every unit in workbook order through a single
//! [`SequenceBank`] and flush each unit's buffers to the sink.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rangeplate_render::{MiniJinjaEngine, TemplateEngine};
use tracing::{debug, info};

use crate::check::check_workbook;
use crate::config::RunConfig;
use crate::driver::{RenderDriver, SourceUnit, WarnedUnits};
use crate::error::Result;
use crate::scope::{load_functions, load_scopes, FunctionTable, ScopeTable};
use crate::sequence::{load_sequences, SequenceBank};
use crate::sink::{FolderSink, OutputSink};
use crate::workbook::Workbook;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub units: usize,
    pub records: usize,
    /// Every target that received output.
    pub targets: BTreeSet<String>,
    /// Folder written to, when the sink writes files.
    pub output: Option<PathBuf>,
}

/// Global state loaded from the global sheet.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    pub scopes: ScopeTable,
    pub sequences: SequenceBank,
    pub functions: FunctionTable,
}

impl GlobalState {
    /// Loads scopes, sequences and functions from the workbook's global sheet.
    ///
    /// A workbook without one yields empty tables.
    pub fn load(workbook: &Workbook, config: &RunConfig) -> Result<Self> {
        let Some(sheet) = workbook.sheet(&config.global_sheet) else {
            debug!("no [{}] sheet, no global variables", config.global_sheet);
            return Ok(Self::default());
        };
        let rows = sheet.rows(config.data_start_row, config.data_start_col);
        Ok(Self {
            scopes: load_scopes(&rows, config),
            sequences: load_sequences(&rows, config),
            functions: load_functions(&rows, config)?,
        })
    }
}

/// Renders a whole workbook.
pub struct Runner<E = MiniJinjaEngine> {
    config: RunConfig,
    engine: E,
    skip_check: bool,
}

impl Runner<MiniJinjaEngine> {
    /// A runner using the default template engine.
    pub fn new(config: RunConfig) -> Self {
        Self::with_engine(config, MiniJinjaEngine::new())
    }
}

impl<E: TemplateEngine> Runner<E> {
    pub fn with_engine(config: RunConfig, engine: E) -> Self {
        Self {
            config,
            engine,
            skip_check: false,
        }
    }

    /// Disables the pre-run workbook checks.
    pub fn skip_check(mut self, skip: bool) -> Self {
        self.skip_check = skip;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the workbook checks, unless disabled.
    pub fn check(&self, workbook: &Workbook) -> Result<()> {
        if self.skip_check {
            return Ok(());
        }
        check_workbook(workbook, &self.config)
    }

    /// Checks, loads and renders `workbook` into `sink`.
    ///
    /// # Errors
    ///
    /// The first error aborts the run. Output of units flushed before the
    /// error stays in the sink.
    pub fn run<S: OutputSink>(&self, workbook: &Workbook, sink: &mut S) -> Result<RunSummary> {
        self.check(workbook)?;
        self.render(workbook, sink)
    }

    /// Checks the workbook, then renders it into a new timestamped folder
    /// under `parent`.
    ///
    /// The folder is only created once the checks pass.
    pub fn run_in_folder(&self, workbook: &Workbook, parent: &Path, prefix: &str) -> Result<RunSummary> {
        self.check(workbook)?;
        let mut sink = FolderSink::timestamped(parent, prefix, self.config.output_extension.clone())?;
        self.render(workbook, &mut sink)
    }

    fn render<S: OutputSink>(&self, workbook: &Workbook, sink: &mut S) -> Result<RunSummary> {
        let GlobalState {
            scopes,
            mut sequences,
            functions,
        } = GlobalState::load(workbook, &self.config)?;
        let driver = RenderDriver::new(&self.engine, &self.config, &scopes, &functions);
        let mut warned = WarnedUnits::new();
        let mut summary = RunSummary {
            output: sink.location().map(PathBuf::from),
            ..RunSummary::default()
        };

        for sheet in workbook.sheets() {
            let Some(unit) = SourceUnit::from_sheet(sheet, &self.config) else {
                debug!("[{}] is not a template sheet, skipped", sheet.name());
                continue;
            };
            info!("[{}] rendering started", unit.name);
            let output = driver.render_unit(&unit, &mut sequences, &mut warned)?;
            for (target, text) in output.buffers.iter() {
                sink.append(target, text)?;
                summary.targets.insert(target.to_string());
            }
            info!(
                "[{}] rendering finished: {} record(s), {} target(s)",
                unit.name,
                output.records,
                output.buffers.len()
            );
            summary.units += 1;
            summary.records += output.records;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sink::MemorySink;
    use crate::workbook::Sheet;

    fn workbook(sheets: &[(&str, &str)]) -> Workbook {
        Workbook::new(
            sheets
                .iter()
                .map(|(name, csv)| Sheet::from_csv(*name, csv).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_targets_shared_across_units() {
        let wb = workbook(&[
            ("a_system", "t\nhostname {{ host }},host\n,h1-2\n"),
            ("b_ifaces", "t\nif {{ port }},host,port\n,h1,1-2\n"),
        ]);
        let mut sink = MemorySink::new();
        let summary = Runner::new(RunConfig::default()).run(&wb, &mut sink).unwrap();

        assert_eq!(summary.units, 2);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.output, None);
        assert_eq!(sink.get("h1"), Some("hostname h1\nif 1\nif 2\n"));
        assert_eq!(sink.get("h2"), Some("hostname h2\n"));
    }

    #[test]
    fn test_globals_loaded_once_for_all_units() {
        let wb = workbook(&[
            (
                "GLOBAL_VARS",
                "g\nkind,name,value\n,ALL,domain,lab\n,GEN,lo,10.0.0.1-3\n,FUN,fqdn,def fqdn(h): h ~ '.' ~ domain\n",
            ),
            ("a", "t\n{{ lo }},host\n,h1-2\n"),
            ("b", "t\n{{ lo }},host\n,h3\n"),
        ]);
        let mut sink = MemorySink::new();
        Runner::new(RunConfig::default()).run(&wb, &mut sink).unwrap();
        assert_eq!(sink.get("h1"), Some("10.0.0.1\n"));
        assert_eq!(sink.get("h2"), Some("10.0.0.2\n"));
        assert_eq!(sink.get("h3"), Some("10.0.0.3\n"));
    }

    #[test]
    fn test_check_runs_unless_skipped() {
        let wb = workbook(&[("bad-name", "t\n{{ host }},host\n,h1\n")]);
        let err = Runner::new(RunConfig::default())
            .run(&wb, &mut MemorySink::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut sink = MemorySink::new();
        Runner::new(RunConfig::default())
            .skip_check(true)
            .run(&wb, &mut sink)
            .unwrap();
        assert_eq!(sink.get("h1"), Some("h1\n"));
    }

    #[test]
    fn test_failed_check_creates_no_folder() {
        let wb = workbook(&[("bad-name", "t\n{{ host }},host\n,h1\n")]);
        let out = tempfile::tempdir().unwrap();
        let err = Runner::new(RunConfig::default())
            .run_in_folder(&wb, out.path(), "OUTPUTS")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_in_folder_writes_targets() {
        let wb = workbook(&[("a", "t\n{{ host }},host\n,h1\n")]);
        let out = tempfile::tempdir().unwrap();
        let summary = Runner::new(RunConfig::default())
            .run_in_folder(&wb, out.path(), "OUTPUTS_lab")
            .unwrap();
        let folder = summary.output.unwrap();
        assert!(folder.starts_with(out.path()));
        assert!(folder
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("OUTPUTS_lab_"));
        assert_eq!(std::fs::read_to_string(folder.join("h1.txt")).unwrap(), "h1\n");
    }

    #[test]
    fn test_missing_global_sheet_is_empty() {
        let wb = workbook(&[("a", "t\n{{ host }},host\n,h1\n")]);
        let state = GlobalState::load(&wb, &RunConfig::default()).unwrap();
        assert!(state.scopes.is_empty());
        assert!(state.sequences.is_empty());
        assert!(state.functions.is_empty());
    }
}
