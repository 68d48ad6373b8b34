//! Command-line entry point.
//!
//! ```text
//! rangeplate [WORKBOOK] [--config run.yaml] [--output-dir DIR] [--skip-check] [-v]
//! ```

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rangeplate::{RunConfig, Runner, Workbook};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_WORKBOOK: &str = "config";

/// Render per-target configuration files from a workbook of CSV sheets.
#[derive(Parser, Debug)]
#[command(name = "rangeplate")]
#[command(version)]
#[command(about = "Render per-target configuration files from range-expanded spreadsheet rows")]
struct Cli {
    /// Workbook directory holding one CSV file per sheet [default: config]
    workbook: Option<PathBuf>,

    /// YAML run configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parent directory of the timestamped output folder
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Log file, appended to on every run
    #[arg(long, value_name = "FILE", default_value = "rangeplate.log")]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,

    /// Render without the pre-run workbook checks
    #[arg(long)]
    skip_check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let file = if cli.no_log_file {
        None
    } else {
        let log: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("cannot open log file {}", cli.log_file.display()))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log))
                .with_ansi(false)
                .with_filter(filter()),
        )
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => RunConfig::default(),
    };

    let path = cli
        .workbook
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK));
    let workbook = Workbook::open(&path)
        .with_context(|| format!("cannot read workbook {}", path.display()))?;
    info!(
        "workbook {} loaded: {} sheet(s)",
        path.display(),
        workbook.sheets().len()
    );

    let prefix = config.folder_prefix(cli.workbook.as_deref());
    let summary = Runner::new(config)
        .skip_check(cli.skip_check)
        .run_in_folder(&workbook, &cli.output_dir, &prefix)?;

    info!(
        "done: {} unit(s), {} record(s), {} target(s) in {}",
        summary.units,
        summary.records,
        summary.targets.len(),
        summary
            .output
            .as_deref()
            .unwrap_or(cli.output_dir.as_path())
            .display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli) {
        eprintln!("Error: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
