//! Error types for a rangeplate run.
//!
//! Every variant here aborts the run. Non-fatal conditions (unresolved
//! template variables, function name mismatches) are logged as warnings and
//! never surface as errors.

use rangeplate_render::{FunctionError, RenderError};
use thiserror::Error;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A generated variable was consumed more times than it has values.
    #[error("sequence <{name}> exhausted: all {declared} declared values were used")]
    ExhaustedSequence { name: String, declared: usize },

    /// A sequence was consumed that was never declared.
    #[error("unknown sequence <{0}>")]
    UnknownSequence(String),

    /// An expanded record has no target field.
    #[error("[{unit}] record has no <{field}> field to route output")]
    MissingTargetField { unit: String, field: String },

    /// The target field holds a list or nested value instead of a name.
    #[error("[{unit}] <{field}> must be a single value, not a list")]
    InvalidTarget { unit: String, field: String },

    /// The workbook failed its pre-run checks.
    #[error("workbook check failed with {} problem(s):\n{}", .0.len(), .0.join("\n"))]
    Validation(Vec<String>),

    /// A computed function could not be loaded.
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Template extraction or rendering failed.
    #[error("[{unit}] {source}")]
    Render {
        unit: String,
        #[source]
        source: RenderError,
    },

    /// Reading the workbook or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sheet could not be parsed as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is not valid YAML for [`RunConfig`](crate::RunConfig).
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    /// Wraps a render error with the unit it happened in.
    pub fn render(unit: impl Into<String>, source: RenderError) -> Self {
        Error::Render {
            unit: unit.into(),
            source,
        }
    }
}

/// Result type for rangeplate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = Error::ExhaustedSequence {
            name: "loopback".into(),
            declared: 3,
        };
        assert_eq!(
            err.to_string(),
            "sequence <loopback> exhausted: all 3 declared values were used"
        );
    }

    #[test]
    fn test_validation_lists_problems() {
        let err = Error::Validation(vec!["bad sheet".into(), "bad header".into()]);
        let text = err.to_string();
        assert!(text.contains("2 problem(s)"));
        assert!(text.contains("bad sheet\nbad header"));
    }

    #[test]
    fn test_render_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::render("vlans", RenderError::TemplateError("boom".into()));
        assert!(err.to_string().starts_with("[vlans] template error: boom"));
        assert!(err.source().is_some());
    }
}
