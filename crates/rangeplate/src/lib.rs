//! # Rangeplate - per-target configuration files from spreadsheet rows
//!
//! A workbook pairs a Jinja template with rows of compact range notation.
//! Every row expands into one record per combination of its cells, each
//! record is merged with scoped and generated variables, rendered, and routed
//! to the output file of its target (usually a host).
//!
//! ## Workbook Layout
//!
//! A workbook is a directory of CSV sheets. With the default [`RunConfig`]:
//!
//! ```text
//! GLOBAL_VARS.csv            interfaces.csv
//!  row 3+: scope,name,value   A2: template   row 2 from B: headers
//!                                            row 3+ from B: data rows
//! ```
//!
//! Global rows assign scoped variables (`ALL` applies everywhere), declare
//! sequences (`GEN`) whose values are handed out one per record, and define
//! computed functions (`FUN`).
//!
//! ## Quick Start
//!
//! ```rust
//! use rangeplate::{MemorySink, RunConfig, Runner, Sheet, Workbook};
//!
//! let workbook = Workbook::new(vec![
//!     Sheet::from_csv("ports", "Ports\n{{ host }}:{{ port }},host,port\n,h1,1-2\n,h2,3\n").unwrap(),
//! ]);
//! let mut sink = MemorySink::new();
//! let summary = Runner::new(RunConfig::default()).run(&workbook, &mut sink).unwrap();
//!
//! assert_eq!(summary.records, 3);
//! assert_eq!(sink.get("h1"), Some("h1:1\nh1:2\n"));
//! assert_eq!(sink.get("h2"), Some("h2:3\n"));
//! ```
//!
//! ## Modules
//!
//! - [`workbook`]: CSV sheets with 1-based cell access
//! - [`scope`], [`sequence`]: global sheet loading
//! - [`merge`]: variable precedence for one record
//! - [`driver`]: rendering one sheet into per-target buffers
//! - [`sink`]: where buffers end up
//! - [`check`]: pre-run workbook checks
//! - [`runner`]: the whole run

pub mod check;
pub mod config;
pub mod driver;
mod error;
pub mod merge;
pub mod runner;
pub mod scope;
pub mod sequence;
pub mod sink;
pub mod workbook;

pub use config::RunConfig;
pub use driver::{RenderDriver, SourceUnit};
pub use error::{Error, Result};
pub use runner::{GlobalState, RunSummary, Runner};
pub use sink::{FolderSink, MemorySink, OutputSink};
pub use workbook::{Sheet, Workbook};
