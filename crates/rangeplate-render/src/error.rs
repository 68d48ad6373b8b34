//! Error types for template rendering.
//!
//! [`RenderError`] is the error type for every rendering operation. It wraps
//! the template engine's errors so callers never depend on the engine crate.
//! [`FunctionError`] covers computed-function definitions read from input.

use std::fmt;

use thiserror::Error;

/// Error type for template rendering operations.
#[derive(Debug)]
pub enum RenderError {
    /// Template syntax error or compilation failure.
    TemplateError(String),

    /// Failure while evaluating a template (bad call, bad operand, ...).
    OperationError(String),

    /// A computed function could not be built.
    Function(FunctionError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateError(msg) => write!(f, "template error: {}", msg),
            RenderError::OperationError(msg) => write!(f, "{}", msg),
            RenderError::Function(err) => write!(f, "function error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Function(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FunctionError> for RenderError {
    fn from(err: FunctionError) -> Self {
        RenderError::Function(err)
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::TemplateError(err.to_string()),
            _ => RenderError::OperationError(err.to_string()),
        }
    }
}

/// Errors raised while reading a computed-function definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// The definition does not start with `def <name>(<params>):`.
    #[error("function <{name}> has no `def <name>(<params>): <expression>` header")]
    MissingDefinition { name: String },

    /// The definition header is present but the expression is empty.
    #[error("function <{name}> has an empty body")]
    EmptyBody { name: String },

    /// The expression does not compile.
    #[error("function <{name}> does not compile: {message}")]
    InvalidExpression { name: String, message: String },
}
